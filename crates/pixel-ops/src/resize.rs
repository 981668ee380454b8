//! Aspect-ratio-preserving box-filter resize.
//!
//! The target canvas is never stretched: the more constraining dimension
//! determines an effective sub-rectangle that keeps the source aspect ratio,
//! centered in the canvas, and everything outside it is fully transparent
//! padding. Each destination pixel inside the effective rectangle is the
//! channel-wise integer-truncated mean of its mapped source region (a box
//! filter). Upsampling replicates the mean of a possibly 1x1 source region,
//! which produces blocky magnification; that asymmetry is intentional.

use crate::buffer::{ImageBuffer, Pixel};

/// The aspect-correct sub-region of a resize target that receives content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Compute the centered effective rectangle for resizing a `width`x`height`
/// source into a `target_width`x`target_height` canvas.
///
/// Whichever target dimension is more constraining is used in full; the other
/// is scaled to preserve the source aspect ratio (never below 1 pixel).
pub fn effective_rect(
    width: usize,
    height: usize,
    target_width: usize,
    target_height: usize,
) -> EffectiveRect {
    // original_aspect > target_aspect, cross-multiplied to stay in integers.
    let (effective_width, effective_height) = if width * target_height > target_width * height {
        let effective_height = (height * target_width / width).max(1);
        (target_width, effective_height)
    } else {
        let effective_width = (width * target_height / height).max(1);
        (effective_width, target_height)
    };

    EffectiveRect {
        x: (target_width - effective_width) / 2,
        y: (target_height - effective_height) / 2,
        width: effective_width,
        height: effective_height,
    }
}

/// Resize `source` into a new `target_width`x`target_height` buffer.
///
/// # Panics (debug only)
///
/// Debug-asserts that both target dimensions are non-zero (the protocol
/// layer guarantees this for requests coming off the wire).
pub fn resize(source: &ImageBuffer, target_width: usize, target_height: usize) -> ImageBuffer {
    debug_assert!(
        target_width > 0 && target_height > 0,
        "target dimensions must be non-zero"
    );

    let rect = effective_rect(source.width(), source.height(), target_width, target_height);
    let mut target = ImageBuffer::new(target_width, target_height);

    let ratio_x = source.width() as f64 / rect.width as f64;
    let ratio_y = source.height() as f64 / rect.height as f64;

    for dy in 0..rect.height {
        let sy_start = (dy as f64 * ratio_y) as usize;
        let sy_end = source_span_end(dy, ratio_y, sy_start, source.height());

        for dx in 0..rect.width {
            let sx_start = (dx as f64 * ratio_x) as usize;
            let sx_end = source_span_end(dx, ratio_x, sx_start, source.width());

            let pixel = if sx_start >= sx_end || sy_start >= sy_end {
                // Degenerate source rectangle at a boundary: defined as
                // transparent rather than reading out of bounds.
                Pixel::TRANSPARENT
            } else {
                region_mean(source, sx_start..sx_end, sy_start..sy_end)
            };

            target.set_pixel(rect.x + dx, rect.y + dy, pixel);
        }
    }

    target
}

/// End (exclusive) of the source span for destination index `d`.
///
/// At least one source pixel is included when available, so upsampling
/// replicates a 1x1 region instead of sampling nothing.
fn source_span_end(d: usize, ratio: f64, start: usize, limit: usize) -> usize {
    (((d + 1) as f64 * ratio) as usize).max(start + 1).min(limit)
}

/// Channel-wise integer-truncated mean over a non-empty source region.
fn region_mean(
    source: &ImageBuffer,
    xs: std::ops::Range<usize>,
    ys: std::ops::Range<usize>,
) -> Pixel {
    let mut sums = [0u64; 4];
    let mut count = 0u64;
    for y in ys {
        for x in xs.clone() {
            let channels = source.pixel(x, y).channels();
            for (sum, channel) in sums.iter_mut().zip(channels) {
                *sum += u64::from(channel);
            }
            count += 1;
        }
    }
    Pixel::new(
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
        (sums[3] / count) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, pixel: Pixel) -> ImageBuffer {
        ImageBuffer::from_pixels(vec![pixel; width * height], width, height)
    }

    #[test]
    fn test_effective_rect_width_limited() {
        // 4:1 source into a square target: width wins, height shrinks.
        let rect = effective_rect(400, 100, 100, 100);
        assert_eq!(rect.width, 100);
        assert_eq!(rect.height, 25);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 37); // (100 - 25) / 2
    }

    #[test]
    fn test_effective_rect_height_limited() {
        let rect = effective_rect(100, 400, 100, 100);
        assert_eq!(rect.width, 25);
        assert_eq!(rect.height, 100);
        assert_eq!(rect.x, 37);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_effective_rect_fits_and_keeps_aspect() {
        for &(w, h, tw, th) in &[
            (800usize, 600usize, 64usize, 64usize),
            (600, 800, 64, 64),
            (320, 200, 199, 57),
            (10, 10, 100, 3),
            (7, 13, 64, 64),
        ] {
            let rect = effective_rect(w, h, tw, th);
            assert!(rect.width <= tw && rect.height <= th, "{w}x{h} -> {tw}x{th}");
            assert!(rect.width >= 1 && rect.height >= 1);
            // One dimension is exact; the other is an integer-truncated
            // scaling of it, so cross-multiplied aspect error is below one
            // unit of the exact dimension.
            let cross_error = (rect.width * h) as i64 - (rect.height * w) as i64;
            assert!(
                cross_error.unsigned_abs() < w.max(h) as u64,
                "{w}x{h} -> {tw}x{th}: effective {}x{} off by {cross_error}",
                rect.width,
                rect.height
            );
        }
    }

    #[test]
    fn test_effective_rect_degenerate_dimension_clamps_to_one() {
        // A 1x1000 strip into a wide short target would truncate the scaled
        // width to zero; it is clamped to a single column instead.
        let rect = effective_rect(1, 1000, 50, 20);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 20);
    }

    #[test]
    fn test_padding_is_fully_transparent() {
        let source = solid(400, 100, Pixel::opaque(200, 10, 10));
        let out = resize(&source, 100, 100);
        let rect = effective_rect(400, 100, 100, 100);

        for y in 0..100 {
            for x in 0..100 {
                let inside = x >= rect.x
                    && x < rect.x + rect.width
                    && y >= rect.y
                    && y < rect.y + rect.height;
                if inside {
                    assert_eq!(out.pixel(x, y), Pixel::opaque(200, 10, 10));
                } else {
                    assert_eq!(out.pixel(x, y), Pixel::TRANSPARENT, "padding at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn test_downsample_is_exact_box_mean() {
        // 4x4 image of 2x2 blocks; halving must average each block exactly.
        let mut source = ImageBuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let v = (x / 2 * 100 + y / 2 * 50) as u8;
                source.set_pixel(x, y, Pixel::new(v, v + 1, v + 2, 255));
            }
        }
        let out = resize(&source, 2, 2);
        assert_eq!(out.pixel(0, 0), Pixel::new(0, 1, 2, 255));
        assert_eq!(out.pixel(1, 0), Pixel::new(100, 101, 102, 255));
        assert_eq!(out.pixel(0, 1), Pixel::new(50, 51, 52, 255));
        assert_eq!(out.pixel(1, 1), Pixel::new(150, 151, 152, 255));
    }

    #[test]
    fn test_downsample_mean_truncates() {
        // Mean of 0 and 255 over a 2x1 -> 1x1 reduction truncates to 127.
        let source = ImageBuffer::from_pixels(
            vec![Pixel::opaque(0, 0, 0), Pixel::opaque(255, 255, 255)],
            2,
            1,
        );
        let out = resize(&source, 1, 1);
        assert_eq!(out.pixel(0, 0), Pixel::new(127, 127, 127, 255));
    }

    #[test]
    fn test_upsample_replicates_blocks() {
        let source = ImageBuffer::from_pixels(
            vec![Pixel::opaque(10, 0, 0), Pixel::opaque(0, 10, 0)],
            2,
            1,
        );
        // 2x1 -> 4x2: each source pixel becomes an opaque block, no
        // transparent holes inside the effective rectangle.
        let out = resize(&source, 4, 2);
        for y in 0..2 {
            for x in 0..4 {
                let expected = if x < 2 {
                    Pixel::opaque(10, 0, 0)
                } else {
                    Pixel::opaque(0, 10, 0)
                };
                assert_eq!(out.pixel(x, y), expected, "at {x},{y}");
            }
        }
    }

    #[test]
    fn test_extreme_aspect_never_reads_out_of_bounds() {
        // 1-pixel-tall source into a tall target exercises the degenerate
        // span clamping; just completing without a panic is the point.
        let source = solid(500, 1, Pixel::opaque(9, 9, 9));
        let out = resize(&source, 3, 300);
        assert_eq!(out.width(), 3);
        assert_eq!(out.height(), 300);
    }
}
