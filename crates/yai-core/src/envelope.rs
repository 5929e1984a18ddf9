//! Binary response envelope.
//!
//! Every response is an 8-byte header followed by a handler-defined payload:
//!
//! ```text
//! +------------+--------------------+-----------------------+
//! | status u32 | payload length u32 | payload (length bytes)|
//! +------------+--------------------+-----------------------+
//! ```
//!
//! All integers are big-endian. Status `0` is success; any other value is an
//! error, and error payloads carry a `u32` count followed by that many
//! length-prefixed UTF-8 strings.

use thiserror::Error;

use crate::stream::{Stream, StreamError};

/// Size of the fixed envelope header.
pub const HEADER_LEN: usize = 8;

/// Status reported by successful responses.
pub const STATUS_OK: u32 = 0;

/// Status reported by error responses.
pub const STATUS_ERROR: u32 = 1;

/// Largest payload accepted when decoding an envelope from a stream.
pub const MAX_DECODED_PAYLOAD: usize = 16 * 1024 * 1024;

/// Reply sent for identifiers that do not select a handler: status 1 with an
/// empty payload.
pub const UNRECOGNIZED_REPLY: [u8; HEADER_LEN] = [0, 0, 0, 1, 0, 0, 0, 0];

/// Errors raised while building or decoding envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A field or payload does not fit a `u32` length.
    #[error("{what} of {size} bytes exceeds the u32 length limit")]
    TooLarge {
        /// Which length overflowed.
        what: &'static str,
        /// Offending size in bytes.
        size: usize,
    },
    /// A decoded payload exceeds [`MAX_DECODED_PAYLOAD`].
    #[error("payload of {size} bytes exceeds {max} byte decode limit")]
    PayloadTooLarge {
        /// Announced payload size.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// The buffer ended before a field was complete.
    #[error("truncated envelope: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required by the field.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },
    /// Bytes followed the announced payload.
    #[error("{count} trailing bytes after envelope payload")]
    TrailingBytes {
        /// Number of unexpected bytes.
        count: usize,
    },
    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Reading the envelope from a stream failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

fn length_field(what: &'static str, size: usize) -> Result<u32, EnvelopeError> {
    u32::try_from(size).map_err(|_| EnvelopeError::TooLarge { what, size })
}

/// Incrementally builds an outbound envelope.
///
/// The builder reserves the header up front; payload fields are appended in
/// order and [`EnvelopeBuilder::finalize`] stamps the payload length.
/// Consuming `self` in `finalize` makes a second finalisation impossible.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    buffer: Vec<u8>,
}

impl EnvelopeBuilder {
    /// Creates a builder with room for at least `expected_size_hint` payload
    /// bytes. Appending beyond the hint reallocates.
    pub fn new(expected_size_hint: usize) -> Self {
        let mut buffer = Vec::with_capacity(HEADER_LEN + expected_size_hint);
        buffer.extend_from_slice(&[0; HEADER_LEN]);
        Self { buffer }
    }

    /// Overwrites the status field.
    pub fn set_status(&mut self, status: u32) -> &mut Self {
        if let Some(field) = self.buffer.get_mut(..4) {
            field.copy_from_slice(&status.to_be_bytes());
        }
        self
    }

    /// Appends a big-endian `u32`.
    pub fn append_u32(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Appends raw bytes without a length prefix or terminator.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Appends a `u32` byte length followed by the UTF-8 bytes of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::TooLarge`] if `value` is longer than
    /// `u32::MAX` bytes.
    pub fn append_string(&mut self, value: &str) -> Result<&mut Self, EnvelopeError> {
        let length = length_field("string field", value.len())?;
        Ok(self.append_u32(length).append_bytes(value.as_bytes()))
    }

    /// Number of payload bytes appended so far.
    pub fn payload_len(&self) -> usize {
        self.buffer.len() - HEADER_LEN
    }

    /// Stamps the payload length and yields the wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::TooLarge`] if the payload exceeds `u32::MAX`
    /// bytes.
    pub fn finalize(mut self) -> Result<EncodedEnvelope, EnvelopeError> {
        let length = length_field("payload", self.payload_len())?;
        if let Some(field) = self.buffer.get_mut(4..HEADER_LEN) {
            field.copy_from_slice(&length.to_be_bytes());
        }
        Ok(EncodedEnvelope {
            bytes: self.buffer,
        })
    }

    /// Builds a finalized error envelope: status 1, a `u32` count, then each
    /// message as a length-prefixed string.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::TooLarge`] if any length overflows `u32`.
    pub fn make_error<I, S>(errors: I) -> Result<EncodedEnvelope, EnvelopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let errors: Vec<S> = errors.into_iter().collect();
        let hint = errors
            .iter()
            .map(|error| 4 + error.as_ref().len())
            .sum::<usize>()
            + 4;
        let mut builder = Self::new(hint);
        builder
            .set_status(STATUS_ERROR)
            .append_u32(length_field("error count", errors.len())?);
        for error in &errors {
            builder.append_string(error.as_ref())?;
        }
        builder.finalize()
    }
}

/// Finalized envelope ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEnvelope {
    bytes: Vec<u8>,
}

impl EncodedEnvelope {
    /// The reply used for unroutable connections.
    pub fn unrecognized() -> Self {
        Self {
            bytes: UNRECOGNIZED_REPLY.to_vec(),
        }
    }

    /// Wire bytes, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total length, header included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: an envelope carries at least its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the envelope to `stream`.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn send(&self, stream: &mut dyn Stream) -> Result<(), StreamError> {
        stream.write(&self.bytes).await?;
        Ok(())
    }
}

/// Decoded inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    status: u32,
    payload: Vec<u8>,
}

impl Envelope {
    /// Decodes an envelope that occupies exactly `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Truncated`] when the header or payload is
    /// incomplete and [`EnvelopeError::TrailingBytes`] when anything follows
    /// the payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let mut reader = PayloadReader::new(bytes);
        let status = reader.read_u32()?;
        let length = reader.read_u32()? as usize;
        let payload = reader.read_bytes(length)?.to_vec();
        if !reader.is_empty() {
            return Err(EnvelopeError::TrailingBytes {
                count: reader.remaining.len(),
            });
        }
        Ok(Self { status, payload })
    }

    /// Reads one envelope from `stream`: the header, then exactly the
    /// announced number of payload bytes.
    ///
    /// # Errors
    ///
    /// Fails if the stream closes early or announces a payload larger than
    /// [`MAX_DECODED_PAYLOAD`].
    pub async fn read_from(stream: &mut dyn Stream) -> Result<Self, EnvelopeError> {
        let status = stream.read_u32().await?;
        let length = stream.read_u32().await? as usize;
        if length > MAX_DECODED_PAYLOAD {
            return Err(EnvelopeError::PayloadTooLarge {
                size: length,
                max: MAX_DECODED_PAYLOAD,
            });
        }
        let mut payload = vec![0_u8; length];
        stream.read_exact(&mut payload).await?;
        Ok(Self { status, payload })
    }

    /// Status field.
    pub fn status(&self) -> u32 {
        self.status
    }

    /// `true` when the status is [`STATUS_OK`].
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Cursor over the payload.
    pub fn reader(&self) -> PayloadReader<'_> {
        PayloadReader::new(&self.payload)
    }

    /// Decodes the conventional error list carried by error envelopes.
    ///
    /// An empty payload decodes to no errors, which covers the unrecognized
    /// reply.
    ///
    /// # Errors
    ///
    /// Fails if the payload is not a well-formed error list.
    pub fn errors(&self) -> Result<Vec<String>, EnvelopeError> {
        if self.payload.is_empty() {
            return Ok(Vec::new());
        }
        self.reader().read_errors()
    }
}

/// Sequential reader over envelope payload fields.
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    remaining: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Starts reading at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { remaining: bytes }
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, EnvelopeError> {
        let bytes = self.read_bytes(4)?;
        let mut field = [0_u8; 4];
        field.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(field))
    }

    /// Reads `length` raw bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], EnvelopeError> {
        if self.remaining.len() < length {
            return Err(EnvelopeError::Truncated {
                needed: length,
                available: self.remaining.len(),
            });
        }
        let (head, tail) = self.remaining.split_at(length);
        self.remaining = tail;
        Ok(head)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, EnvelopeError> {
        let length = self.read_u32()? as usize;
        let bytes = self.read_bytes(length)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Reads a count-prefixed list of length-prefixed strings.
    pub fn read_errors(&mut self) -> Result<Vec<String>, EnvelopeError> {
        let count = self.read_u32()?;
        (0..count).map(|_| self.read_string()).collect()
    }

    /// `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
