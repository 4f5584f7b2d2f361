//! Document sources and the surfaces they render to.
//!
//! A `DocumentRenderer` turns a source (PNG, JPEG, PDF, ...) into a
//! `DocumentSurface` once per signing session. The surface's pixel size is
//! the canonical coordinate space for ink.

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use np_core::data_url::DataUrl;
use np_core::error::RenderError;
use np_core::geometry::SurfaceSize;

// ─── Surface ─────────────────────────────────────────────────────────────

/// Rasterized source document. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSurface {
    pixels: RgbaImage,
}

impl DocumentSurface {
    /// Wrap existing pixels. Zero-area surfaces are allowed here; the
    /// compositor rejects them.
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Uniformly colored surface (blank page).
    pub fn filled(size: SurfaceSize, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(size.width, size.height, Rgba(rgba)))
    }

    pub fn size(&self) -> SurfaceSize {
        let (width, height) = self.pixels.dimensions();
        SurfaceSize::new(width, height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

// ─── Source ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Png,
    Jpeg,
    Pdf,
    Other(String),
}

impl DocumentKind {
    fn from_mime(mime: &str) -> Self {
        match mime {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "application/pdf" => Self::Pdf,
            other => Self::Other(other.to_string()),
        }
    }

    /// Sniff from magic bytes.
    fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF") {
            return Self::Pdf;
        }
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Self::Png,
            Ok(ImageFormat::Jpeg) => Self::Jpeg,
            Ok(other) => Self::Other(format!("{other:?}")),
            Err(_) => Self::Other("unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl DocumentSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            kind: DocumentKind::sniff(&bytes),
            bytes,
        }
    }

    /// `data:application/pdf;base64,...`, `data:image/png;base64,...`
    pub fn from_data_url(url: &str) -> Result<Self, RenderError> {
        let DataUrl { mime, bytes } = DataUrl::parse(url)?;
        Ok(Self {
            kind: DocumentKind::from_mime(&mime),
            bytes,
        })
    }
}

impl From<DataUrl> for DocumentSource {
    fn from(url: DataUrl) -> Self {
        Self {
            kind: DocumentKind::from_mime(&url.mime),
            bytes: url.bytes,
        }
    }
}

// ─── Renderers ───────────────────────────────────────────────────────────

/// Turns a source document into pixels fitting inside `target`.
///
/// Only the first page of a document is ever rendered.
pub trait DocumentRenderer {
    fn render(&self, source: &DocumentSource, target: SurfaceSize) -> Result<DocumentSurface, RenderError>;
}

/// Decodes raster documents and scales them to fit the target box,
/// preserving aspect ratio. PDF needs an external renderer.
#[derive(Debug, Clone)]
pub struct RasterDocumentRenderer {
    pub filter: FilterType,
}

impl Default for RasterDocumentRenderer {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

/// Largest size with the aspect ratio of `source` that fits in `target`.
pub fn fit_size(source: SurfaceSize, target: SurfaceSize) -> SurfaceSize {
    if source.is_empty() || target.is_empty() {
        return SurfaceSize::new(0, 0);
    }
    let scale = (target.width as f64 / source.width as f64)
        .min(target.height as f64 / source.height as f64);
    let dim = |v: u32, max: u32| ((v as f64 * scale).round() as u32).clamp(1, max);
    SurfaceSize::new(dim(source.width, target.width), dim(source.height, target.height))
}

impl DocumentRenderer for RasterDocumentRenderer {
    fn render(&self, source: &DocumentSource, target: SurfaceSize) -> Result<DocumentSurface, RenderError> {
        match &source.kind {
            DocumentKind::Png | DocumentKind::Jpeg => {}
            DocumentKind::Pdf => return Err(RenderError::UnsupportedFormat("application/pdf".into())),
            DocumentKind::Other(kind) => return Err(RenderError::UnsupportedFormat(kind.clone())),
        }
        if target.is_empty() {
            return Err(RenderError::EmptySurface {
                width: target.width,
                height: target.height,
            });
        }

        let decoded = image::load_from_memory(&source.bytes)
            .map_err(|e| RenderError::Decode(e.to_string()))?
            .to_rgba8();
        let natural = SurfaceSize::new(decoded.width(), decoded.height());
        let fitted = fit_size(natural, target);
        if fitted.is_empty() {
            return Err(RenderError::EmptySurface {
                width: natural.width,
                height: natural.height,
            });
        }

        let pixels = if fitted == natural {
            decoded
        } else {
            imageops::resize(&decoded, fitted.width, fitted.height, self.filter)
        };
        log::debug!("rendered {:?} document {natural} -> {fitted}", source.kind);
        Ok(DocumentSurface::new(pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_preserves_aspect_ratio() {
        let page = SurfaceSize::new(595, 842);
        assert_eq!(fit_size(page, SurfaceSize::new(595, 842)), page);
        // Width-bound: 400/595 < 900/842.
        let fitted = fit_size(page, SurfaceSize::new(400, 900));
        assert_eq!(fitted.width, 400);
        assert_eq!(fitted.height, 566);
        assert_eq!(fit_size(page, SurfaceSize::new(0, 10)), SurfaceSize::new(0, 0));
    }

    #[test]
    fn sniffs_pdf_and_png() {
        assert_eq!(DocumentSource::from_bytes(b"%PDF-1.7 ...".to_vec()).kind, DocumentKind::Pdf);
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(DocumentSource::from_bytes(png.to_vec()).kind, DocumentKind::Png);
    }

    #[test]
    fn data_url_sets_kind_from_mime() {
        let src = DocumentSource::from_data_url("data:application/pdf;base64,JVBERi0=").unwrap();
        assert_eq!(src.kind, DocumentKind::Pdf);
        assert_eq!(src.bytes, b"%PDF-");
    }

    #[test]
    fn pdf_needs_an_external_renderer() {
        let src = DocumentSource::from_bytes(b"%PDF-1.4".to_vec());
        let err = RasterDocumentRenderer::default()
            .render(&src, SurfaceSize::new(100, 100))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(_)));
    }

    #[test]
    fn corrupt_png_is_a_decode_error() {
        let src = DocumentSource {
            kind: DocumentKind::Png,
            bytes: vec![1, 2, 3],
        };
        let err = RasterDocumentRenderer::default()
            .render(&src, SurfaceSize::new(100, 100))
            .unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }
}
