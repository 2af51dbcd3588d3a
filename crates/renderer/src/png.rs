//! PNG encoding for rendered maps.
//!
//! Supports two colour types:
//! - **RGB (color type 2)**: used when every pixel is opaque, which is the
//!   normal case for a map composited over an opaque basemap.
//! - **RGBA (color type 6)**: used when any pixel carries transparency.
//!
//! Use [`encode_image`] for automatic selection, or [`create_png`] /
//! [`create_png_rgb`] for an explicit colour type.

use std::io::Write;

use image::RgbaImage;

use crate::error::RenderError;

/// PNG file signature
const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_RGB: u8 = 2;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode an RGBA image, dropping the alpha channel when it is fully opaque.
pub fn encode_image(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let (width, height) = image.dimensions();
    let pixels = image.as_raw();

    if pixels.chunks_exact(4).all(|p| p[3] == 255) {
        let rgb: Vec<u8> = pixels
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect();
        create_png_rgb(&rgb, width as usize, height as usize)
    } else {
        create_png(pixels, width as usize, height as usize)
    }
}

/// Create a PNG image from RGBA pixel data (color type 6).
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    encode(pixels, width, height, COLOR_TYPE_RGBA, 4)
}

/// Create a PNG image from RGB pixel data (color type 2).
pub fn create_png_rgb(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    encode(pixels, width, height, COLOR_TYPE_RGB, 3)
}

fn encode(
    pixels: &[u8],
    width: usize,
    height: usize,
    color_type: u8,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!(
            "image must be non-empty, got {}x{}",
            width, height
        )));
    }
    if width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(RenderError::Encode(format!(
            "image {}x{} exceeds PNG dimensions",
            width, height
        )));
    }
    let expected = width * height * bytes_per_pixel;
    if pixels.len() != expected {
        return Err(RenderError::Encode(format!(
            "expected {} bytes for {}x{}, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat(pixels, width * bytes_per_pixel, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    // CRC covers type and data, not length
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate scanlines for the IDAT chunk.
fn deflate_idat(pixels: &[u8], stride: usize, height: usize) -> std::io::Result<Vec<u8>> {
    // Add filter byte (0 = no filter) to each scanline
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}
