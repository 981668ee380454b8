//! K-means color quantization in 4-channel RGBA space.
//!
//! A single run with randomly sampled initial centers and a fixed iteration
//! count, no convergence-based early exit and no multi-restart. Output is
//! intentionally non-deterministic across runs; the only guarantee is that
//! every output pixel equals one of at most `color_count` center colors.
//! [`quantize_with_rng`] exposes the random source so tests can seed it.

use rand::Rng;

use crate::buffer::{ImageBuffer, Pixel};

/// Fixed number of refinement iterations before the final assignment pass.
const KMEANS_ITERATIONS: usize = 50;

/// Quantize `image` toward at most `color_count` representative colors.
///
/// Uses the thread-local random source; see [`quantize_with_rng`] for the
/// deterministic variant.
pub fn quantize(image: ImageBuffer, color_count: usize) -> ImageBuffer {
    quantize_with_rng(image, color_count, &mut rand::thread_rng())
}

/// [`quantize`] with a caller-supplied random source.
///
/// Centers are initialized by sampling `color_count` pixel positions
/// uniformly with replacement; duplicate samples are permitted and simply
/// degrade the effective color count. Each iteration assigns every pixel to
/// the center with the smallest squared Euclidean distance over all four
/// channels (ties keep the lowest center index) and recomputes each center
/// as the channel-wise integer-truncated mean of its pixels. A center with
/// no assigned pixels keeps its previous value; it may be re-populated later
/// or stay stale for the rest of the run.
///
/// # Panics (debug only)
///
/// Debug-asserts that `color_count >= 1`.
pub fn quantize_with_rng<R: Rng + ?Sized>(
    mut image: ImageBuffer,
    color_count: usize,
    rng: &mut R,
) -> ImageBuffer {
    debug_assert!(color_count >= 1, "color count must be at least 1");

    let pixel_count = image.pixels().len();
    let mut centers: Vec<Pixel> = (0..color_count)
        .map(|_| image.pixels()[rng.gen_range(0..pixel_count)])
        .collect();
    let mut assignments = vec![0usize; pixel_count];

    for _ in 0..KMEANS_ITERATIONS {
        assign_pixels(image.pixels(), &centers, &mut assignments);
        update_centers(image.pixels(), &assignments, &mut centers);
    }

    // Final assignment pass against the settled centers, then replace every
    // pixel with its center's color.
    assign_pixels(image.pixels(), &centers, &mut assignments);
    for (pixel, &center) in image.pixels_mut().iter_mut().zip(&assignments) {
        *pixel = centers[center];
    }

    image
}

/// Assign each pixel to its nearest center index.
fn assign_pixels(pixels: &[Pixel], centers: &[Pixel], assignments: &mut [usize]) {
    for (pixel, assignment) in pixels.iter().zip(assignments.iter_mut()) {
        *assignment = nearest_center(*pixel, centers);
    }
}

/// Index of the center minimizing squared distance; first match wins ties.
fn nearest_center(pixel: Pixel, centers: &[Pixel]) -> usize {
    let mut best = 0;
    let mut best_distance = squared_distance(pixel, centers[0]);
    for (index, &center) in centers.iter().enumerate().skip(1) {
        let distance = squared_distance(pixel, center);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

/// Squared Euclidean distance over all four channels.
fn squared_distance(a: Pixel, b: Pixel) -> u32 {
    a.channels()
        .into_iter()
        .zip(b.channels())
        .map(|(x, y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

/// Recompute each center as the truncated mean of its assigned pixels.
fn update_centers(pixels: &[Pixel], assignments: &[usize], centers: &mut [Pixel]) {
    let mut sums = vec![[0u64; 4]; centers.len()];
    let mut counts = vec![0u64; centers.len()];

    for (pixel, &assignment) in pixels.iter().zip(assignments) {
        for (sum, channel) in sums[assignment].iter_mut().zip(pixel.channels()) {
            *sum += u64::from(channel);
        }
        counts[assignment] += 1;
    }

    for (index, center) in centers.iter_mut().enumerate() {
        // Empty centers keep their previous value; never divide by zero.
        if counts[index] > 0 {
            *center = Pixel::new(
                (sums[index][0] / counts[index]) as u8,
                (sums[index][1] / counts[index]) as u8,
                (sums[index][2] / counts[index]) as u8,
                (sums[index][3] / counts[index]) as u8,
            );
        }
    }
}
