//! `np sign`: replay a pointer script over a document.

use anyhow::{Context, Result};
use clap::Args;
use np_client::{BackendClient, submit};
use np_core::{ErrorKind, Sale, SurfaceMessage, SurfaceSize};
use np_editor::{InputEvent, SigningSession};
use np_render::{DocumentRenderer, DocumentSource, RasterDocumentRenderer};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Document to sign (PNG or JPEG)
    #[arg(long)]
    pub document: PathBuf,

    /// JSON array of pointer events: {"type":"down","x":..,"y":..}, ...
    #[arg(long)]
    pub events: PathBuf,

    /// Size of the surface the events were recorded on; defaults to the
    /// rendered document size
    #[arg(long, value_parser = parse_size)]
    pub input_size: Option<SurfaceSize>,

    /// Where to write the flattened PNG
    #[arg(long)]
    pub out: PathBuf,

    /// Upload the result to the backend
    #[arg(long)]
    pub upload: bool,

    /// Document number (`NUMDOC60`) of the sale being signed; latest sale
    /// when omitted
    #[arg(long, requires = "upload")]
    pub sale: Option<String>,

    /// Override the sale's record id sent as `vendaId`
    #[arg(long, requires = "upload")]
    pub sale_id: Option<String>,

    /// Override the name the upload is stored under
    #[arg(long, requires = "upload")]
    pub filename: Option<String>,

    /// Also write the bare ink layer (transparent background) as PNG
    #[arg(long)]
    pub signature_out: Option<PathBuf>,

    /// Print the result as a surface message envelope on stdout
    #[arg(long)]
    pub emit_message: bool,
}

pub fn parse_size(s: &str) -> Result<SurfaceSize, String> {
    SurfaceSize::parse(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))
}

fn read_events(path: &Path) -> Result<Vec<InputEvent>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing pointer events in {}", path.display()))
}

/// Where an upload goes: `(filename, record id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadTarget {
    filename: String,
    record_id: String,
}

impl UploadTarget {
    /// Derive from `sale`, letting explicit values win.
    fn for_sale(sale: &Sale, record_id: Option<&str>, filename: Option<&str>) -> Result<Self> {
        let record_id = match record_id {
            Some(id) => id.to_string(),
            None => sale
                .record_id()
                .with_context(|| format!("sale {} has neither id nor LANSAI60", sale.document))?
                .to_string(),
        };
        Ok(Self {
            filename: filename.map_or_else(|| sale.signed_filename(), str::to_string),
            record_id,
        })
    }

    async fn resolve(client: &BackendClient, args: &SignArgs) -> Result<Self> {
        if let (Some(record_id), Some(filename)) = (&args.sale_id, &args.filename) {
            return Ok(Self {
                filename: filename.clone(),
                record_id: record_id.clone(),
            });
        }
        let sale = crate::commands::find_sale(client, args.sale.as_deref()).await?;
        log::info!("signing sale {} for {}", sale.document, sale.customer_name);
        Self::for_sale(&sale, args.sale_id.as_deref(), args.filename.as_deref())
    }
}

pub async fn run(config_path: &Path, args: SignArgs) -> Result<()> {
    let config = crate::commands::load(config_path)?;

    let upload = if args.upload {
        let client = BackendClient::new(&config)
            .with_context(|| format!("configuration in {} is incomplete", config_path.display()))?;
        let target = UploadTarget::resolve(&client, &args).await?;
        Some((client, target))
    } else {
        None
    };

    let bytes = std::fs::read(&args.document).with_context(|| format!("reading {}", args.document.display()))?;
    let source = DocumentSource::from_bytes(bytes);
    let surface = RasterDocumentRenderer::default()
        .render(&source, config.document_size)
        .with_context(|| format!("rendering {}", args.document.display()))?;
    let input = args.input_size.unwrap_or(surface.size());

    let events = read_events(&args.events)?;
    let mut session = SigningSession::new(surface, input, config.ink)?;
    let dropped = events.iter().filter(|e| session.handle(e).is_err()).count();
    if dropped > 0 {
        log::warn!("{dropped} of {} pointer samples dropped", events.len());
    }

    let outcome = match &upload {
        Some((client, target)) => submit(&mut session, client, &target.filename, &target.record_id)
            .await
            .map_err(anyhow::Error::from),
        None => session.confirm().map(|_| ()).map_err(anyhow::Error::from),
    };

    // A failed upload still leaves a usable composite behind.
    if let Some(image) = session.composite() {
        std::fs::write(&args.out, image.as_png()).with_context(|| format!("writing {}", args.out.display()))?;
        log::info!("wrote {} ({})", args.out.display(), image.size());
    }

    if let Some(path) = &args.signature_out {
        let ink = np_render::render_ink(session.ink(), session.surface().size());
        let png = np_render::composite::encode_png(&ink)?;
        std::fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
    }

    if args.emit_message {
        let message = match (session.composite(), &outcome) {
            (Some(image), Ok(())) => SurfaceMessage::CompositeResult(image.as_png().to_vec()),
            (Some(_), Err(_)) => SurfaceMessage::Error(ErrorKind::Upload),
            (None, _) if session.ink().is_empty() => SurfaceMessage::Error(ErrorKind::Capture),
            (None, _) => SurfaceMessage::Error(ErrorKind::Encoding),
        };
        println!("{}", message.encode());
    }

    outcome
}
