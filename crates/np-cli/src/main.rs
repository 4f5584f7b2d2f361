//! `np`: promissory-note signing from the command line.
//!
//! Wraps the backend client and the signing session: look up sales, fetch
//! or generate their notes, replay a recorded pointer script over a
//! document, and upload the flattened result.

mod commands;
mod sign;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "np", version, about = "Sign promissory notes and send them to the sales backend")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "np.json")]
    config: PathBuf,

    /// More logging (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or edit the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Query sales at the configured branch and terminal
    #[command(subcommand)]
    Sales(SalesCommand),

    /// Search customers by name
    Customers { name: String },

    /// Replay a pointer script over a document and flatten the result
    Sign(sign::SignArgs),

    /// Download a previously uploaded signed note
    FetchSigned {
        filename: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Generate a sale's promissory note and save it as-is (usually PDF)
    Generate {
        /// Document number (`NUMDOC60`); latest sale when omitted
        #[arg(long)]
        document: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    /// Change settings; needs today's maintenance code
    Set {
        /// Maintenance code (see `np config unlock`)
        #[arg(long)]
        unlock_code: String,
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        terminal: Option<String>,
        /// Pen width in document pixels
        #[arg(long)]
        ink_width: Option<f32>,
        /// Document render size, e.g. 595x842
        #[arg(long, value_parser = sign::parse_size)]
        document_size: Option<np_core::SurfaceSize>,
    },
    /// Check whether a maintenance code is valid today
    Unlock { code: String },
}

#[derive(Subcommand, Debug)]
enum SalesCommand {
    Latest,
    List {
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        document: Option<String>,
        /// Only sales whose note is already signed
        #[arg(long)]
        signed_only: bool,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("{cli:?}");

    match cli.command {
        Command::Config(ConfigCommand::Show) => commands::config_show(&cli.config),
        Command::Config(ConfigCommand::Set {
            unlock_code,
            api_url,
            branch,
            terminal,
            ink_width,
            document_size,
        }) => commands::config_set(
            &cli.config,
            &unlock_code,
            commands::ConfigUpdate {
                api_url,
                branch,
                terminal,
                ink_width,
                document_size,
            },
        ),
        Command::Config(ConfigCommand::Unlock { code }) => commands::config_unlock(&code),
        Command::Sales(SalesCommand::Latest) => commands::sales_latest(&cli.config).await,
        Command::Sales(SalesCommand::List {
            customer,
            document,
            signed_only,
            limit,
        }) => {
            let filter = np_core::SaleFilter {
                customer,
                document,
                signed_only,
                limit,
                ..np_core::SaleFilter::default()
            };
            commands::sales_list(&cli.config, &filter).await
        }
        Command::Customers { name } => commands::customers(&cli.config, &name).await,
        Command::Sign(args) => sign::run(&cli.config, args).await,
        Command::FetchSigned { filename, out } => commands::fetch_signed(&cli.config, &filename, &out).await,
        Command::Generate { document, out } => commands::generate(&cli.config, document.as_deref(), &out).await,
    }
}
