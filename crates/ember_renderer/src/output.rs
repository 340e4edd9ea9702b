//! Image writers for a finished [`Framebuffer`].
//!
//! - PPM (`P3` plain text), rows top to bottom
//! - BMP (24-bit, uncompressed), rows bottom to top in BGR order
//! - PNG through the `image` crate

use crate::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Size of the BMP file header plus the BITMAPINFOHEADER.
const BMP_HEADER_SIZE: u32 = 14 + 40;

/// 72 DPI expressed in pixels per meter.
const BMP_PIXELS_PER_METER: i32 = 2835;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Image too large for the container: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Container formats the renderer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Ppm,
    Bmp,
    Png,
}

impl ImageFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> OutputResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "ppm" => Ok(Self::Ppm),
            "bmp" => Ok(Self::Bmp),
            "png" => Ok(Self::Png),
            _ => Err(OutputError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Write `framebuffer` to `path`, choosing the container from the extension.
pub fn write_image(framebuffer: &Framebuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;

    match format {
        ImageFormat::Ppm => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_ppm(framebuffer, &mut writer)?;
            writer.flush()?;
        }
        ImageFormat::Bmp => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_bmp(framebuffer, &mut writer)?;
            writer.flush()?;
        }
        ImageFormat::Png => {
            let rgb = image::RgbImage::from_raw(
                framebuffer.width(),
                framebuffer.height(),
                framebuffer.to_rgb8(),
            )
            .ok_or(OutputError::TooLarge {
                width: framebuffer.width(),
                height: framebuffer.height(),
            })?;
            rgb.save_with_format(path, image::ImageFormat::Png)?;
        }
    }

    log::info!("Saved {:?} image to {}", format, path.display());
    Ok(())
}

/// Stream the plain-text PPM form: header, then one `R G B` line per pixel.
pub fn write_ppm<W: Write>(framebuffer: &Framebuffer, writer: &mut W) -> OutputResult<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", framebuffer.width(), framebuffer.height())?;
    writeln!(writer, "255")?;

    for [r, g, b] in framebuffer.encode() {
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    Ok(())
}

/// Write a 24-bit BMP.
///
/// Rows are stored bottom to top, each pixel as `B G R`, each row padded with
/// zeros to a multiple of four bytes.
pub fn write_bmp<W: Write>(framebuffer: &Framebuffer, writer: &mut W) -> OutputResult<()> {
    let width = framebuffer.width();
    let height = framebuffer.height();
    let too_large = || OutputError::TooLarge { width, height };

    let row_bytes = width as usize * 3;
    let padding = (4 - row_bytes % 4) % 4;
    let stride = row_bytes + padding;

    let image_size = u32::try_from(stride * height as usize).map_err(|_| too_large())?;
    let file_size = image_size.checked_add(BMP_HEADER_SIZE).ok_or_else(too_large)?;
    let width_field = i32::try_from(width).map_err(|_| too_large())?;
    let height_field = i32::try_from(height).map_err(|_| too_large())?;

    // BITMAPFILEHEADER
    writer.write_all(b"BM")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?; // reserved
    writer.write_all(&0u16.to_le_bytes())?; // reserved
    writer.write_all(&BMP_HEADER_SIZE.to_le_bytes())?; // pixel data offset

    // BITMAPINFOHEADER
    writer.write_all(&40u32.to_le_bytes())?;
    writer.write_all(&width_field.to_le_bytes())?;
    writer.write_all(&height_field.to_le_bytes())?; // positive: bottom-up rows
    writer.write_all(&1u16.to_le_bytes())?; // color planes
    writer.write_all(&24u16.to_le_bytes())?; // bits per pixel
    writer.write_all(&0u32.to_le_bytes())?; // BI_RGB, no compression
    writer.write_all(&image_size.to_le_bytes())?;
    writer.write_all(&BMP_PIXELS_PER_METER.to_le_bytes())?;
    writer.write_all(&BMP_PIXELS_PER_METER.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // palette colors
    writer.write_all(&0u32.to_le_bytes())?; // important colors

    let pixels = framebuffer.encode();
    let pad = [0u8; 3];
    let mut line = Vec::with_capacity(stride);

    if row_bytes > 0 {
        for row in pixels.chunks(width as usize).rev() {
            line.clear();
            for &[r, g, b] in row {
                line.extend_from_slice(&[b, g, r]);
            }
            line.extend_from_slice(&pad[..padding]);
            writer.write_all(&line)?;
        }
    }

    Ok(())
}
