//! Basemap loading.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use map_common::CanvasSize;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;

/// How a source raster is fitted onto the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BasemapFit {
    /// Scale the whole image to the canvas.
    #[default]
    Resize,
    /// Keep rows `[offset, offset + height)` and columns `[0, width)` of an
    /// uncropped source, unscaled.
    CropRows { offset: u32 },
}

/// The background raster markers are drawn onto.
#[derive(Debug, Clone)]
pub struct Basemap {
    image: RgbaImage,
}

impl Basemap {
    /// Decode an image file and fit it to `canvas`.
    pub fn load(path: &Path, canvas: CanvasSize, fit: BasemapFit) -> Result<Self, RenderError> {
        let source = image::open(path).map_err(|source| RenderError::Basemap {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            width = source.width(),
            height = source.height(),
            "Decoded basemap"
        );
        Self::fit(source, canvas, fit)
    }

    /// Fit an already decoded image to `canvas`.
    pub fn fit(source: DynamicImage, canvas: CanvasSize, fit: BasemapFit) -> Result<Self, RenderError> {
        let source = source.to_rgba8();
        let image = match fit {
            BasemapFit::Resize => {
                if source.dimensions() == (canvas.width, canvas.height) {
                    source
                } else {
                    imageops::resize(&source, canvas.width, canvas.height, FilterType::Triangle)
                }
            }
            BasemapFit::CropRows { offset } => {
                let fits = source.width() >= canvas.width
                    && source.height() as u64 >= offset as u64 + canvas.height as u64;
                if !fits {
                    return Err(RenderError::BasemapTooSmall {
                        width: source.width(),
                        height: source.height(),
                        needed_width: canvas.width,
                        needed_height: canvas.height,
                        offset,
                    });
                }
                imageops::crop_imm(&source, 0, offset, canvas.width, canvas.height).to_image()
            }
        };
        Ok(Self { image })
    }

    /// A single-colour opaque basemap.
    pub fn blank(canvas: CanvasSize, color: [u8; 3]) -> Self {
        let [r, g, b] = color;
        Self {
            image: RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([r, g, b, 255])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.image.width(), self.image.height())
    }
}
