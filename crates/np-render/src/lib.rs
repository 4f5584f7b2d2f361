pub mod composite;
pub mod document;
pub mod preview;
pub mod raster;

pub use composite::{CompositeImage, composite, composite_raster, flatten};
pub use document::{DocumentKind, DocumentRenderer, DocumentSource, DocumentSurface, RasterDocumentRenderer};
pub use preview::InkPreview;
pub use raster::render_ink;

// Re-export the pixel type so downstream crates don't need a direct `image` dependency
pub use image::RgbaImage;
