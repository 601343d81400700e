//! Binary `.tree` storage format.
//!
//! A 32-byte header followed by a postcard-encoded [`TreeModelSchema`].
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`TreeModelSchema`]: super::schema::TreeModelSchema

use std::io::{Read, Write};

use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a model file.
pub const MAGIC: &[u8; 4] = b"LTRE";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header of the binary format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("LTRE")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       2     Reserved
/// 8       4     Payload size (bytes)
/// 12      4     CRC32 checksum of payload
/// 16      4     Number of features
/// 20      4     Number of tree nodes
/// 24      4     Number of predicates
/// 28      4     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Feature values per example.
    pub num_features: u32,
    /// Nodes in the tree.
    pub num_nodes: u32,
    /// Predicates in the model's pool.
    pub num_predicates: u32,
}

impl FormatHeader {
    /// Create a header with the current version and an empty payload.
    pub fn new(num_features: u32, num_nodes: u32, num_predicates: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size: 0,
            checksum: 0,
            num_features,
            num_nodes,
            num_predicates,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf[16..20].copy_from_slice(&self.num_features.to_le_bytes());
        buf[20..24].copy_from_slice(&self.num_nodes.to_le_bytes());
        buf[24..28].copy_from_slice(&self.num_predicates.to_le_bytes());
        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAModel);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let word = |offset: usize| {
            u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
        };

        Ok(Self {
            version_major,
            version_minor,
            payload_size: word(8),
            checksum: word(12),
            num_features: word(16),
            num_nodes: word(20),
            num_predicates: word(24),
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Wrong magic bytes.
    #[error("not a learntree model file")]
    NotAModel,

    /// Written by a newer format version.
    #[error("model requires format {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Bytes left over after the payload.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// Native Codec
// ============================================================================

/// CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Codec for the binary format.
#[derive(Debug, Clone, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Write header and payload; fills in the header's size and checksum.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        header: &mut FormatHeader,
        payload: &[u8],
    ) -> Result<(), SerializeError> {
        header.payload_size = u32::try_from(payload.len()).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload exceeds 4 GiB")
        })?;
        header.checksum = compute_checksum(payload);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(payload)?;
        Ok(())
    }

    /// Read header and checksum-verified payload.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<(FormatHeader, Vec<u8>), DeserializeError> {
        let mut header_buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                DeserializeError::Truncated {
                    expected: HEADER_SIZE,
                    actual: 0,
                }
            } else {
                DeserializeError::Io(e)
            }
        })?;

        let header = FormatHeader::from_bytes(&header_buf)?;

        let expected = header.payload_size as usize;
        let mut payload = Vec::with_capacity(expected);
        reader.by_ref().take(expected as u64).read_to_end(&mut payload)?;
        if payload.len() < expected {
            return Err(DeserializeError::Truncated {
                expected,
                actual: payload.len(),
            });
        }

        let actual_checksum = compute_checksum(&payload);
        if actual_checksum != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual: actual_checksum,
            });
        }

        Ok((header, payload))
    }

    /// Serialize `payload` with postcard behind a header.
    pub fn serialize<T: serde::Serialize>(
        &self,
        mut header: FormatHeader,
        payload: &T,
    ) -> Result<Vec<u8>, SerializeError> {
        let payload_bytes = postcard::to_allocvec(payload)?;
        let mut output = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
        self.write_to(&mut output, &mut header, &payload_bytes)?;
        Ok(output)
    }

    /// Deserialize a payload from a complete byte slice.
    pub fn deserialize<T: for<'de> serde::Deserialize<'de>>(
        &self,
        bytes: &[u8],
    ) -> Result<(FormatHeader, T), DeserializeError> {
        let mut cursor = bytes;
        let (header, payload_bytes) = self.read_from(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(DeserializeError::CorruptPayload(format!(
                "{} trailing bytes after payload",
                cursor.len()
            )));
        }
        let (payload, rest) = postcard::take_from_bytes(&payload_bytes)?;
        if !rest.is_empty() {
            return Err(DeserializeError::CorruptPayload(format!(
                "{} undecoded payload bytes",
                rest.len()
            )));
        }
        Ok((header, payload))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = FormatHeader {
            version_major: 1,
            version_minor: 3,
            payload_size: 4096,
            checksum: 0xDEADBEEF,
            num_features: 784,
            num_nodes: 1023,
            num_predicates: 311,
        };

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"LTRE");
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
        assert_eq!(FormatHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn header_wrong_magic() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"BSTR");
        assert!(matches!(FormatHeader::from_bytes(&buf), Err(DeserializeError::NotAModel)));
    }

    #[test]
    fn header_unsupported_version() {
        let mut header = FormatHeader::new(64, 1, 1);
        header.version_major = CURRENT_VERSION_MAJOR + 1;
        assert!(matches!(
            FormatHeader::from_bytes(&header.to_bytes()),
            Err(DeserializeError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn codec_write_read_roundtrip() {
        let codec = NativeCodec::new();
        let mut header = FormatHeader::new(64, 7, 3);
        let payload = b"tree payload";

        let mut buffer = Vec::new();
        codec.write_to(&mut buffer, &mut header, payload).unwrap();
        assert_eq!(buffer.len(), HEADER_SIZE + payload.len());

        let (read_header, read_payload) = codec.read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(read_header, header);
        assert_eq!(read_header.payload_size as usize, payload.len());
        assert_eq!(read_payload, payload);
    }

    #[test]
    fn codec_detects_corruption() {
        let codec = NativeCodec::new();
        let mut buffer = Vec::new();
        codec
            .write_to(&mut buffer, &mut FormatHeader::new(64, 1, 1), b"some model data")
            .unwrap();

        buffer[HEADER_SIZE + 5] ^= 0xFF;
        assert!(matches!(
            codec.read_from(&mut buffer.as_slice()),
            Err(DeserializeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn codec_detects_truncation() {
        let codec = NativeCodec::new();
        let mut buffer = Vec::new();
        codec
            .write_to(&mut buffer, &mut FormatHeader::new(64, 1, 1), b"some model data")
            .unwrap();

        buffer.truncate(HEADER_SIZE + 4);
        assert!(matches!(
            codec.read_from(&mut buffer.as_slice()),
            Err(DeserializeError::Truncated { expected: 15, actual: 4 })
        ));

        assert!(matches!(
            codec.read_from(&mut &buffer[..10]),
            Err(DeserializeError::Truncated { .. })
        ));
    }

    #[test]
    fn serialize_deserialize_value() {
        let codec = NativeCodec::new();
        let value = (vec![1u32, 2, 3], String::from("leaf"));
        let bytes = codec.serialize(FormatHeader::new(9, 3, 2), &value).unwrap();

        let (header, decoded): (_, (Vec<u32>, String)) = codec.deserialize(&bytes).unwrap();
        assert_eq!(header.num_features, 9);
        assert_eq!(decoded, value);
    }

    #[test]
    fn deserialize_rejects_trailing_bytes() {
        let codec = NativeCodec::new();
        let mut bytes = codec.serialize(FormatHeader::new(1, 1, 1), &7u32).unwrap();
        bytes.push(0);
        assert!(matches!(
            codec.deserialize::<u32>(&bytes),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }
}
