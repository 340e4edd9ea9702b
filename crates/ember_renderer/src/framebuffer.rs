//! Accumulation buffer and 8-bit encoding.

use crate::Color;
use ember_math::Interval;
use rayon::prelude::*;

/// Range a normalized channel is clamped to before gamma, i.e. `[0, 1)`.
const INTENSITY: Interval = Interval::new(0.0, 0.999);

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Dense row-major buffer of per-pixel sample sums.
///
/// Cells hold the unnormalized sum of `samples_per_pixel` radiance samples;
/// division happens at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Wrap existing sums. Returns `None` if `pixels` is not `width * height` long.
    pub fn from_pixels(
        width: u32,
        height: u32,
        samples_per_pixel: u32,
        pixels: Vec<Color>,
    ) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            samples_per_pixel,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    /// Get the accumulated sum at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Add one sample to the cell at (x, y).
    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] += color;
    }

    /// All accumulated sums in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable access for the scheduler, which splits it into row bands.
    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Average, clamp, gamma-correct and quantize one accumulated cell.
    pub fn encode_pixel(&self, sum: Color) -> [u8; 3] {
        let color = sum / self.samples_per_pixel as f32;
        let quantize = |c: f32| (256.0 * linear_to_gamma(INTENSITY.clamp(c))) as u8;
        [quantize(color.x), quantize(color.y), quantize(color.z)]
    }

    /// Encode every cell to 8-bit RGB, row-major, top row first.
    pub fn encode(&self) -> Vec<[u8; 3]> {
        self.pixels
            .par_iter()
            .map(|&sum| self.encode_pixel(sum))
            .collect()
    }

    /// Encoded pixels flattened to `RGBRGB...` bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.encode().into_iter().flatten().collect()
    }
}
