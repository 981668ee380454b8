//! PNG decode/encode boundary.
//!
//! [`decode`] reads any well-formed PNG and normalizes it to 8-bit RGBA:
//! palette entries are expanded, sub-byte grayscale is widened, grayscale is
//! replicated across RGB, a missing alpha channel is filled opaque and 16-bit
//! channels are truncated to 8 bits. [`encode`] always writes 8-bit RGBA,
//! non-interlaced. No other image format is supported.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::buffer::{ImageBuffer, Pixel};

/// Errors from the PNG codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The source file could not be opened, or the destination created.
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stream is not a well-formed PNG signature/header.
    #[error("not a valid PNG ({0})")]
    Format(String),

    /// Decoding aborted mid-stream.
    #[error("PNG data is corrupt ({0})")]
    Corrupt(String),

    /// Writing the encoded image failed.
    #[error("failed to write {path} ({detail})")]
    Write { path: PathBuf, detail: String },
}

/// Decode the PNG at `path` into an RGBA [`ImageBuffer`].
pub fn decode(path: impl AsRef<Path>) -> Result<ImageBuffer, CodecError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CodecError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut decoder = png::Decoder::new(BufReader::new(file));
    // EXPAND turns palette into RGB, widens sub-byte grayscale and expands
    // tRNS into a real alpha channel; STRIP_16 truncates 16-bit channels.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder.read_info().map_err(|e| match e {
        // An I/O failure here means the stream ended under the decoder.
        png::DecodingError::IoError(io) => CodecError::Corrupt(io.to_string()),
        other => CodecError::Format(other.to_string()),
    })?;

    let mut data = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut data)
        .map_err(|e| CodecError::Corrupt(e.to_string()))?;
    data.truncate(info.buffer_size());

    let width = info.width as usize;
    let height = info.height as usize;
    let pixels = normalize_to_rgba(&data, info.color_type)
        .ok_or_else(|| CodecError::Corrupt(format!("unexpected color type {:?}", info.color_type)))?;

    if pixels.len() != width * height {
        return Err(CodecError::Corrupt(format!(
            "decoded {} pixels for a {width}x{height} image",
            pixels.len()
        )));
    }

    Ok(ImageBuffer::from_pixels(pixels, width, height))
}

/// Encode `image` as an 8-bit RGBA non-interlaced PNG at `path`.
///
/// A failed write is reported as an error; the partially written file is
/// never presented as a success.
pub fn encode(path: impl AsRef<Path>, image: &ImageBuffer) -> Result<(), CodecError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| CodecError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |e: png::EncodingError| CodecError::Write {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        image.width() as u32,
        image.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(write_err)?;
    writer
        .write_image_data(&image.to_rgba_bytes())
        .map_err(write_err)?;
    // finish() flushes the underlying BufWriter; a failure here must not be
    // swallowed or the caller would observe a truncated file as success.
    writer.finish().map_err(write_err)?;

    Ok(())
}

/// Map post-transformation decoder output to RGBA pixels.
///
/// After `EXPAND | STRIP_16` the decoder only produces 8-bit grayscale,
/// grayscale+alpha, RGB or RGBA rows.
fn normalize_to_rgba(data: &[u8], color_type: png::ColorType) -> Option<Vec<Pixel>> {
    let pixels = match color_type {
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .map(|c| Pixel::new(c[0], c[1], c[2], c[3]))
            .collect(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .map(|c| Pixel::opaque(c[0], c[1], c[2]))
            .collect(),
        png::ColorType::Grayscale => data.iter().map(|&g| Pixel::opaque(g, g, g)).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .map(|c| Pixel::new(c[0], c[0], c[0], c[1]))
            .collect(),
        // Indexed is expanded to RGB by the decoder before we see it.
        png::ColorType::Indexed => return None,
    };
    Some(pixels)
}
