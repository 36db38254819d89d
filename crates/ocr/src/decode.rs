use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot open image: {0}")]
    Open(#[from] std::io::Error),
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode image for OCR: {0}")]
    Encode(String),
}

/// Load an image file of any supported format and return PNG bytes for the OCR engine.
///
/// The format is sniffed from the file contents first, so a PNG saved as
/// `scan.jpg` still decodes.
pub fn load_for_ocr(path: &Path) -> Result<Vec<u8>, DecodeError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    encode_as_png(&img)
}

fn encode_as_png(img: &DynamicImage) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| DecodeError::Encode(e.to_string()))?;
    Ok(buf)
}
