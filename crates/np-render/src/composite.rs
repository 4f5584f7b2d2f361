//! Flatten ink onto the document and encode the result as PNG.

use crate::document::DocumentSurface;
use crate::raster::render_ink;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use np_core::error::EncodingError;
use np_core::geometry::SurfaceSize;
use np_core::model::InkLayer;

/// The signed artifact: document plus ink, PNG-encoded. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeImage {
    size: SurfaceSize,
    png: Vec<u8>,
}

impl CompositeImage {
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }
}

/// Rasterize `ink` at the surface size, flatten, encode.
pub fn composite(surface: &DocumentSurface, ink: &InkLayer) -> Result<CompositeImage, EncodingError> {
    check_surface(surface)?;
    let layer = render_ink(ink, surface.size());
    composite_raster(surface, &layer)
}

/// Flatten an already-rasterized ink layer (e.g. the live preview) and encode.
pub fn composite_raster(surface: &DocumentSurface, ink: &RgbaImage) -> Result<CompositeImage, EncodingError> {
    let flat = flatten(surface, ink)?;
    let png = encode_png(&flat)?;
    log::debug!("composite {} encoded to {} bytes", surface.size(), png.len());
    Ok(CompositeImage {
        size: surface.size(),
        png,
    })
}

/// Document first, ink on top (source-over), same dimensions.
pub fn flatten(surface: &DocumentSurface, ink: &RgbaImage) -> Result<RgbaImage, EncodingError> {
    check_surface(surface)?;
    let size = surface.size();
    if ink.dimensions() != (size.width, size.height) {
        return Err(EncodingError::SizeMismatch {
            width: size.width,
            height: size.height,
            ink_width: ink.width(),
            ink_height: ink.height(),
        });
    }

    let mut out = surface.pixels().clone();
    for (dst, src) in out.pixels_mut().zip(ink.pixels()) {
        blend_over(dst, *src);
    }
    Ok(out)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodingError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|e| EncodingError::Codec(e.to_string()))?;
    if png.is_empty() {
        return Err(EncodingError::EmptyOutput);
    }
    Ok(png)
}

fn check_surface(surface: &DocumentSurface) -> Result<(), EncodingError> {
    let size = surface.size();
    if size.is_empty() {
        return Err(EncodingError::EmptySurface {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Straight-alpha source-over. Transparent ink leaves the document pixel
/// untouched bit for bit.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3];
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = src;
        return;
    }

    let sa = sa as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let s = src.0[c] as f32 / 255.0;
        let d = dst.0[c] as f32 / 255.0;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst.0[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
