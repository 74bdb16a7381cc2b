//! Headless capture: PNG screenshots.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::ppu::FrameBuffer;

/// Grey level for each 2-bit shade, lightest first.
const GREYS: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

/// Save `frame` as an 8-bit greyscale PNG.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(frame: &FrameBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width as u32, frame.height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&to_grey(frame))?;
    Ok(())
}

fn to_grey(frame: &FrameBuffer) -> Vec<u8> {
    frame.pixels.iter().map(|&shade| GREYS[usize::from(shade & 0x03)]).collect()
}
