//! pixel-ops: RGBA image buffer, PNG codec, resize and quantization
//!
//! This crate holds the image-processing half of pixforge, kept free of any
//! networking concerns so the algorithms can be tested in isolation.
//!
//! # Quick Start
//!
//! ```no_run
//! use pixel_ops::{codec, quantize, resize};
//!
//! # fn main() -> Result<(), pixel_ops::CodecError> {
//! let image = codec::decode("photo.png")?;
//! let small = resize::resize(&image, 64, 64);
//! let posterized = quantize::quantize(small, 8);
//! codec::encode("thumb.png", &posterized)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PNG file --decode--> ImageBuffer (RGBA8, rectangular)
//!                          |
//!              +-----------+-----------+
//!              v                       v
//!     resize (box filter,      quantize (k-means,
//!     aspect-preserving,       fixed 50 iterations,
//!     transparent padding)     <= K output colors)
//!              |                       |
//!              +-----------+-----------+
//!                          v
//!                ImageBuffer --encode--> PNG file (RGBA8)
//! ```
//!
//! The codec normalizes every PNG flavor (palette, grayscale, 16-bit,
//! missing alpha) to 8-bit RGBA on decode, so the engines only ever see one
//! pixel format.

pub mod buffer;
pub mod codec;
pub mod quantize;
pub mod resize;


pub use buffer::{ImageBuffer, Pixel};
pub use codec::CodecError;
pub use resize::EffectiveRect;
