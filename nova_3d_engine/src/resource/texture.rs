//! Texture assets and the BMP decoder
//!
//! Supports uncompressed 24-bit and 32-bit BMP files, the only format the
//! asset pipeline produces. Decoded pixels are always RGBA8, top-down,
//! regardless of how the file stores them.

use crate::error::{Error, Result};
use std::path::Path;

/// BMP file header size (14 bytes) plus the minimum DIB header (40 bytes)
const BMP_MIN_HEADER_SIZE: usize = 54;

/// A decoded image, RGBA8, rows top to bottom
#[derive(Debug, Clone)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Build an image from raw RGBA8 pixel data
    ///
    /// # Errors
    ///
    /// Fails when `pixels` is not exactly `width * height * 4` bytes or
    /// either dimension is zero.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidAsset(format!(
                "Texture dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidAsset(format!(
                "Texture pixel data is {} bytes, expected {} for {}x{} RGBA",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Load and decode a BMP file from disk
    pub fn load_bmp<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            Error::InvalidAsset(format!("Cannot read texture file {}: {}", path.display(), e))
        })?;
        Self::decode_bmp(&bytes)
    }

    /// Decode BMP bytes into an RGBA8 image
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAsset`] for truncated files, compressed BMPs,
    /// or bit depths other than 24 and 32.
    pub fn decode_bmp(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < BMP_MIN_HEADER_SIZE {
            return Err(Error::InvalidAsset(format!(
                "BMP file is {} bytes, shorter than its {}-byte header",
                bytes.len(),
                BMP_MIN_HEADER_SIZE
            )));
        }
        if &bytes[0..2] != b"BM" {
            return Err(Error::InvalidAsset("Not a BMP file".to_string()));
        }

        let pixel_offset = read_u32(bytes, 10) as usize;
        let dib_size = read_u32(bytes, 14);
        if dib_size < 40 {
            return Err(Error::InvalidAsset(format!(
                "Unsupported BMP DIB header size {}",
                dib_size
            )));
        }

        let width = read_i32(bytes, 18);
        let raw_height = read_i32(bytes, 22);
        let bits_per_pixel = read_u16(bytes, 28);
        let compression = read_u32(bytes, 30);

        if width <= 0 || raw_height == 0 {
            return Err(Error::InvalidAsset(format!(
                "BMP has invalid dimensions {}x{}",
                width, raw_height
            )));
        }
        if compression != 0 {
            return Err(Error::InvalidAsset(format!(
                "Compressed BMP (method {}) is not supported",
                compression
            )));
        }
        let bytes_per_pixel = match bits_per_pixel {
            24 => 3usize,
            32 => 4usize,
            other => {
                return Err(Error::InvalidAsset(format!(
                    "BMP bit depth {} is not supported, use 24 or 32",
                    other
                )))
            }
        };

        // Negative height means the rows are already stored top-down
        let top_down = raw_height < 0;
        let width = width as usize;
        let height = raw_height.unsigned_abs() as usize;

        // Rows are padded to 4-byte boundaries
        let row_size = (width * bytes_per_pixel + 3) & !3;
        let data_end = pixel_offset + row_size * height;
        if bytes.len() < data_end {
            return Err(Error::InvalidAsset(format!(
                "BMP pixel data truncated: need {} bytes, file has {}",
                data_end,
                bytes.len()
            )));
        }

        let mut pixels = Vec::with_capacity(width * height * 4);
        for output_row in 0..height {
            let source_row = if top_down {
                output_row
            } else {
                height - 1 - output_row
            };
            let row_start = pixel_offset + source_row * row_size;
            for x in 0..width {
                let p = row_start + x * bytes_per_pixel;
                // BMP stores BGR(A)
                pixels.push(bytes[p + 2]);
                pixels.push(bytes[p + 1]);
                pixels.push(bytes[p]);
                pixels.push(if bytes_per_pixel == 4 { bytes[p + 3] } else { 255 });
            }
        }

        Self::from_rgba8(width as u32, height as u32, pixels)
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data, `width * height * 4` bytes, top row first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Total pixel data size in bytes
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    read_u32(bytes, offset) as i32
}
