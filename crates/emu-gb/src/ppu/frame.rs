//! Completed video frames.

use std::sync::Arc;

/// Visible width in pixels.
pub const WIDTH: usize = 160;
/// Visible height in pixels.
pub const HEIGHT: usize = 144;

/// An immutable 160x144 frame of 2-bit shades (0 = lightest), palette
/// already applied. Row-major: pixel (x, y) is `pixels[y * width + x]`.
///
/// Cloning shares the pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Arc<[u8]>,
}

impl FrameBuffer {
    /// An all-white frame.
    #[must_use]
    pub fn blank() -> Self {
        Self::from_pixels(&[0; WIDTH * HEIGHT])
    }

    pub(crate) fn from_pixels(pixels: &[u8]) -> Self {
        debug_assert_eq!(pixels.len(), WIDTH * HEIGHT);
        Self {
            width: WIDTH,
            height: HEIGHT,
            pixels: Arc::from(pixels),
        }
    }

    /// Shade at (x, y).
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// One row of shades.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::blank()
    }
}
