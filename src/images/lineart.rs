//! Sketch to line-art conversion
//!
//! Pipeline: grayscale, edge map, autocontrast, binarize. The edge map is
//! stored inverted so strong gradients end up as black strokes on white.

use image::{DynamicImage, GrayImage, Luma};
use thiserror::Error;

/// Intensity at or below which a pixel becomes black
pub const THRESHOLD: u8 = 50;

/// Share of the histogram clipped from each end before stretching (percent)
pub const AUTOCONTRAST_CUTOFF: f64 = 5.0;

/// Laplacian kernel used for edge detection
const FIND_EDGES: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]];

/// Line-art conversion errors
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels")]
    Empty,
}

/// Decode raw upload bytes and convert them to line art
pub fn convert_bytes(data: &[u8]) -> Result<GrayImage, ConversionError> {
    let img = image::load_from_memory(data)?;
    convert(&img)
}

/// Convert an image to black/white line art of the same dimensions
pub fn convert(img: &DynamicImage) -> Result<GrayImage, ConversionError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ConversionError::Empty);
    }

    let gray = img.to_luma8();
    let edges = find_edges(&gray);
    let stretched = autocontrast(&edges, AUTOCONTRAST_CUTOFF);
    Ok(binarize(&stretched, THRESHOLD))
}

/// Apply the edge kernel, clamping samples at the borders.
///
/// Output is `255 - response`: flat regions are white, edges dark.
pub fn find_edges(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let mut sum = 0i32;
        for (ky, row) in FIND_EDGES.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                let sx = offset_clamped(x, kx, width);
                let sy = offset_clamped(y, ky, height);
                sum += weight * i32::from(gray.get_pixel(sx, sy)[0]);
            }
        }
        Luma([255 - sum.clamp(0, 255) as u8])
    })
}

/// Neighbour coordinate for kernel column/row `k` (0..3), kept inside the image
fn offset_clamped(coord: u32, k: usize, len: u32) -> u32 {
    (i64::from(coord) + k as i64 - 1).clamp(0, i64::from(len) - 1) as u32
}

/// Stretch the histogram after dropping `cutoff` percent from each end
pub fn autocontrast(img: &GrayImage, cutoff: f64) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[usize::from(pixel[0])] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let cut = (total as f64 * cutoff / 100.0) as u64;
    clip(histogram.iter_mut(), cut);
    clip(histogram.iter_mut().rev(), cut);

    let lo = histogram.iter().position(|&count| count > 0);
    let hi = histogram.iter().rposition(|&count| count > 0);

    let lut: [u8; 256] = match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => std::array::from_fn(|v| {
            let v = v.clamp(lo, hi);
            ((v - lo) * 255 / (hi - lo)) as u8
        }),
        _ => std::array::from_fn(|v| v as u8),
    };

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = lut[usize::from(pixel[0])];
    }
    out
}

/// Remove `cut` samples from the histogram, starting at the first bin yielded
fn clip<'a>(bins: impl Iterator<Item = &'a mut u64>, mut cut: u64) {
    for bin in bins {
        if cut == 0 {
            break;
        }
        let taken = (*bin).min(cut);
        *bin -= taken;
        cut -= taken;
    }
}

/// Pixels above `threshold` become white, the rest black
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    out
}
