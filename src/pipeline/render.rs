//! Page rasterisation: render one PDF page to an in-memory RGB image via pdfium.
//!
//! ## Why scale, not DPI?
//!
//! pdfium measures pages in points (1/72 inch). A linear scale factor of 2.0
//! renders at 144 DPI, quadrupling the pixel area, which is what the OCR
//! model needs to resolve body text. `max_pixels` bounds the longest edge so
//! an A0 poster cannot exhaust memory.

use crate::config::ConversionConfig;
use crate::error::OcrMdError;
use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Rasterisation parameters for the OCR fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Linear zoom relative to the page size in points.
    pub scale: f32,
    /// Cap on either output dimension, in pixels.
    pub max_pixels: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            max_pixels: 8000,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            scale: config.ocr_scale,
            max_pixels: config.max_rendered_pixels,
        }
    }

    /// Pixel size a page of `width_pt` × `height_pt` renders to, after the cap.
    pub fn target_size(&self, width_pt: f32, height_pt: f32) -> (u32, u32) {
        let w = (width_pt * self.scale).max(1.0);
        let h = (height_pt * self.scale).max(1.0);
        let longest = w.max(h);
        let shrink = if longest > self.max_pixels as f32 {
            self.max_pixels as f32 / longest
        } else {
            1.0
        };
        (
            ((w * shrink).round() as u32).max(1),
            ((h * shrink).round() as u32).max(1),
        )
    }
}

/// Render `page` (0-based `index`, used for error reporting) to RGB.
pub fn render_page(
    page: &PdfPage<'_>,
    index: usize,
    options: &RenderOptions,
) -> Result<RgbImage, OcrMdError> {
    let (width, height) = options.target_size(page.width().value, page.height().value);
    let render_config = PdfRenderConfig::new().set_target_size(width as i32, height as i32);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| OcrMdError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

    let image = bitmap.as_image().into_rgb8();
    debug!(
        "Rendered page {} → {}x{} px",
        index + 1,
        image.width(),
        image.height()
    );

    Ok(image)
}
