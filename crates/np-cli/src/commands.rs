//! Config, sales, and document subcommands.

use anyhow::{Context, Result, bail};
use np_client::BackendClient;
use np_core::config::{AppConfig, check_unlock_code};
use np_core::{Sale, SaleFilter, SurfaceSize};
use std::path::Path;

/// Fields `np config set` may change. `None` leaves a field alone.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub api_url: Option<String>,
    pub branch: Option<String>,
    pub terminal: Option<String>,
    pub ink_width: Option<f32>,
    pub document_size: Option<SurfaceSize>,
}

impl ConfigUpdate {
    fn apply(self, config: &mut AppConfig) -> Result<()> {
        if let Some(url) = self.api_url {
            config.api_url = url;
        }
        if let Some(branch) = self.branch {
            config.branch = branch;
        }
        if let Some(terminal) = self.terminal {
            config.terminal = terminal;
        }
        if let Some(width) = self.ink_width {
            if !(width.is_finite() && width > 0.0) {
                bail!("ink width must be a positive number, got {width}");
            }
            config.ink.width = width;
        }
        if let Some(size) = self.document_size {
            if size.is_empty() {
                bail!("document size must not be empty, got {size}");
            }
            config.document_size = size;
        }
        Ok(())
    }
}

pub fn load(path: &Path) -> Result<AppConfig> {
    AppConfig::load_or_default(path).with_context(|| format!("loading {}", path.display()))
}

pub fn connect(path: &Path) -> Result<BackendClient> {
    let config = load(path)?;
    BackendClient::new(&config).with_context(|| format!("configuration in {} is incomplete", path.display()))
}

pub fn config_show(path: &Path) -> Result<()> {
    let config = load(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    if let Err(e) = config.validate() {
        eprintln!("warning: {e}");
    }
    Ok(())
}

fn unlocked(code: &str) -> bool {
    check_unlock_code(code, chrono::Local::now().date_naive())
}

pub fn config_set(path: &Path, unlock_code: &str, update: ConfigUpdate) -> Result<()> {
    if !unlocked(unlock_code) {
        bail!("configuration is locked: invalid unlock code");
    }
    let mut config = load(path)?;
    update.apply(&mut config)?;
    config.save(path)?;
    if let Err(e) = config.validate() {
        eprintln!("saved, but still incomplete: {e}");
    }
    Ok(())
}

pub fn config_unlock(code: &str) -> Result<()> {
    if !unlocked(code) {
        bail!("invalid unlock code");
    }
    println!("valid");
    Ok(())
}

fn print_sale(sale: &Sale) {
    println!(
        "{}\t{}\t{}\t{:.2}\t{}\t{}",
        sale.document,
        sale.issued_at,
        sale.customer_name,
        sale.amount,
        if sale.signed { "signed" } else { "unsigned" },
        sale.signed_filename(),
    );
}

pub async fn sales_latest(path: &Path) -> Result<()> {
    match connect(path)?.latest_sale().await? {
        Some(sale) => print_sale(&sale),
        None => println!("no sales"),
    }
    Ok(())
}

pub async fn sales_list(path: &Path, filter: &SaleFilter) -> Result<()> {
    let sales = connect(path)?.list_sales(filter).await?;
    if sales.is_empty() {
        println!("no sales");
    }
    for sale in &sales {
        print_sale(sale);
    }
    Ok(())
}

pub async fn customers(path: &Path, name: &str) -> Result<()> {
    for customer in connect(path)?.search_customers(name).await? {
        println!("{}\t{}", customer.code, customer.name);
    }
    Ok(())
}

pub async fn fetch_signed(path: &Path, filename: &str, out: &Path) -> Result<()> {
    let png = connect(path)?.fetch_signed(filename).await?;
    std::fs::write(out, &png).with_context(|| format!("writing {}", out.display()))?;
    println!("wrote {} ({} bytes)", out.display(), png.len());
    Ok(())
}

/// Sale with document number `document`, or the latest one.
pub async fn find_sale(client: &BackendClient, document: Option<&str>) -> Result<Sale> {
    let sale = match document {
        Some(doc) => {
            let filter = SaleFilter {
                document: Some(doc.to_string()),
                limit: 1,
                ..SaleFilter::default()
            };
            client.list_sales(&filter).await?.into_iter().next()
        }
        None => client.latest_sale().await?,
    };
    match sale {
        Some(sale) => Ok(sale),
        None => bail!("no matching sale"),
    }
}

pub async fn generate(path: &Path, document: Option<&str>, out: &Path) -> Result<()> {
    let client = connect(path)?;
    let sale = find_sale(&client, document).await?;
    let note = client.generate_promissory(&sale).await?;
    std::fs::write(out, &note.bytes).with_context(|| format!("writing {}", out.display()))?;
    println!("wrote {} ({:?}, {} bytes)", out.display(), note.kind, note.bytes.len());
    Ok(())
}
