//! Task wire protocol codec.
//!
//! Frames are ASCII text with colon-delimited fields and a terminal
//! delimiter, one frame per request:
//!
//! ```text
//! s:<source_path>:<dest_path>:<width>:<height>:
//! q:<source_path>:<dest_path>:<colors>:
//! ```
//!
//! A result frame is either the literal `OK` or free error text. Fields
//! never contain the delimiter; [`encode_request`] rejects offending values
//! instead of truncating them. There is no length prefix, so the session
//! layer buffers reads and uses [`try_parse_request`] to pull complete
//! frames out of the stream without assuming one read equals one frame.

use thiserror::Error;

/// Wire bytes of a successful result frame.
pub const RESULT_OK: &[u8] = b"OK";

/// A parsed task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    /// Resize the PNG at `source` into `width`x`height` at `dest`.
    Scale {
        source: String,
        dest: String,
        width: u32,
        height: u32,
    },
    /// Quantize the PNG at `source` to at most `colors` colors at `dest`.
    Quantize {
        source: String,
        dest: String,
        colors: u32,
    },
}

/// The outcome reported back to the client: success, or a diagnostic.
///
/// Carries no payload beyond the message; the produced image lives at the
/// request's destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Ok,
    Failed(String),
}

/// Errors from parsing or encoding protocol frames.
///
/// Display strings deliberately avoid the `:` delimiter since they travel
/// inside unescaped result frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Fewer than 3 bytes, or a required delimiter absent at an expected
    /// position.
    #[error("frame truncated")]
    Truncated,

    /// The first character is neither `s` nor `q`.
    #[error("unknown request tag '{0}'")]
    UnknownTag(char),

    /// A numeric field failed to parse as a positive integer.
    #[error("invalid integer field '{0}'")]
    BadInteger(String),

    /// A field is empty, non-printable, or contains the delimiter.
    #[error("illegal field value '{0}'")]
    IllegalField(String),
}

/// Parse one complete request frame.
///
/// Strictly positional: tag character, delimiter, then fields scanned left
/// to right to the next delimiter. A field without a terminating delimiter
/// is [`ProtocolError::Truncated`], never a best-effort partial parse.
pub fn parse_request(frame: &[u8]) -> Result<TaskRequest, ProtocolError> {
    if frame.len() < 3 {
        return Err(ProtocolError::Truncated);
    }
    match try_parse_request(frame)? {
        Some((request, _)) => Ok(request),
        None => Err(ProtocolError::Truncated),
    }
}

/// Try to parse a request from the front of a receive buffer.
///
/// Returns `Ok(Some((request, consumed_bytes)))` when a complete frame is
/// available, `Ok(None)` when more bytes are needed, or `Err` when the
/// buffered prefix can never become a valid frame (bad tag, bad integer,
/// malformed delimiter position).
pub fn try_parse_request(buf: &[u8]) -> Result<Option<(TaskRequest, usize)>, ProtocolError> {
    let Some(&tag) = buf.first() else {
        return Ok(None);
    };
    let field_count = match tag {
        b's' => 4,
        b'q' => 3,
        other => return Err(ProtocolError::UnknownTag(other as char)),
    };
    match buf.get(1) {
        None => return Ok(None),
        Some(&b':') => {}
        // The tag is a single character; anything else here is permanently
        // malformed, not awaiting more bytes.
        Some(_) => return Err(ProtocolError::Truncated),
    }

    let mut cursor = 2;
    let mut fields: Vec<&[u8]> = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        let Some(pos) = buf[cursor..].iter().position(|&b| b == b':') else {
            return Ok(None);
        };
        fields.push(&buf[cursor..cursor + pos]);
        cursor += pos + 1;
    }

    let request = match tag {
        b's' => TaskRequest::Scale {
            source: text_field(fields[0])?,
            dest: text_field(fields[1])?,
            width: positive_field(fields[2])?,
            height: positive_field(fields[3])?,
        },
        _ => TaskRequest::Quantize {
            source: text_field(fields[0])?,
            dest: text_field(fields[1])?,
            colors: positive_field(fields[2])?,
        },
    };
    Ok(Some((request, cursor)))
}

/// Serialize a request into a wire frame, validating every field.
pub fn encode_request(request: &TaskRequest) -> Result<Vec<u8>, ProtocolError> {
    let frame = match request {
        TaskRequest::Scale {
            source,
            dest,
            width,
            height,
        } => {
            validate_path(source)?;
            validate_path(dest)?;
            format!("s:{source}:{dest}:{width}:{height}:")
        }
        TaskRequest::Quantize {
            source,
            dest,
            colors,
        } => {
            validate_path(source)?;
            validate_path(dest)?;
            format!("q:{source}:{dest}:{colors}:")
        }
    };
    Ok(frame.into_bytes())
}

/// Serialize a result frame: `OK`, or the raw error text.
///
/// No escaping is performed; result messages are built colon-free by this
/// crate (an accepted protocol limitation).
pub fn encode_result(result: &TaskResult) -> Vec<u8> {
    match result {
        TaskResult::Ok => RESULT_OK.to_vec(),
        TaskResult::Failed(message) => message.clone().into_bytes(),
    }
}

/// Parse a result frame received by a client.
pub fn parse_result(frame: &[u8]) -> TaskResult {
    if frame == RESULT_OK {
        TaskResult::Ok
    } else {
        TaskResult::Failed(String::from_utf8_lossy(frame).into_owned())
    }
}

fn text_field(bytes: &[u8]) -> Result<String, ProtocolError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => Err(ProtocolError::IllegalField(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
    }
}

fn positive_field(bytes: &[u8]) -> Result<u32, ProtocolError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ProtocolError::BadInteger(String::from_utf8_lossy(bytes).into_owned()))?;
    match text.parse::<u32>() {
        // Zero violates the request invariants (width/height > 0, colors
        // >= 1), so it is not a valid value for any numeric slot.
        Ok(0) | Err(_) => Err(ProtocolError::BadInteger(text.to_string())),
        Ok(value) => Ok(value),
    }
}

fn validate_path(path: &str) -> Result<(), ProtocolError> {
    if path.is_empty() || path.contains(':') || path.chars().any(char::is_control) {
        return Err(ProtocolError::IllegalField(path.to_string()));
    }
    Ok(())
}
