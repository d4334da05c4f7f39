//! xdb format constants, structures and the little-endian codec.

use serde::Serialize;
use std::net::Ipv4Addr;

use crate::{Error, Result};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 256;

/// Number of vector index rows (first address octet).
pub const VECTOR_INDEX_ROWS: usize = 256;

/// Number of vector index columns (second address octet).
pub const VECTOR_INDEX_COLS: usize = 256;

/// Size of one vector index entry in bytes.
pub const VECTOR_INDEX_ENTRY_SIZE: usize = 8;

/// Total size of the vector index block.
pub const VECTOR_INDEX_LENGTH: usize = VECTOR_INDEX_ROWS * VECTOR_INDEX_COLS * VECTOR_INDEX_ENTRY_SIZE;

/// File offset of the vector index block.
pub const VECTOR_INDEX_OFFSET: u64 = HEADER_SIZE as u64;

/// Size of one segment index record in bytes.
pub const SEGMENT_INDEX_SIZE: usize = 14;

/// Read a little-endian u16 at `offset`.
///
/// Panics if `buf` holds fewer than `offset + 2` bytes.
#[inline]
pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Read a little-endian u32 at `offset`.
///
/// Panics if `buf` holds fewer than `offset + 4` bytes.
#[inline]
pub fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Parse a dotted-decimal IPv4 address into its numeric form.
///
/// The first octet ends up in the most significant byte.
pub fn parse_ip(ip: &str) -> Result<u32> {
    ip.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| Error::InvalidAddress(ip.to_string()))
}

/// Format a numeric IPv4 address as dotted decimal.
pub fn format_ip(ip: u32) -> String {
    Ipv4Addr::from(ip).to_string()
}

/// Index policy recorded in the header by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexPolicy {
    VectorIndex,
    BTreeIndex,
    Unknown(u16),
}

impl IndexPolicy {
    /// Convert from the raw header value.
    pub fn from_u16(v: u16) -> Self {
        match v {
            1 => IndexPolicy::VectorIndex,
            2 => IndexPolicy::BTreeIndex,
            other => IndexPolicy::Unknown(other),
        }
    }

    /// Convert to the raw header value.
    pub fn as_u16(self) -> u16 {
        match self {
            IndexPolicy::VectorIndex => 1,
            IndexPolicy::BTreeIndex => 2,
            IndexPolicy::Unknown(v) => v,
        }
    }
}

/// Decoded xdb file header (first 256 bytes of the file).
///
/// Only the first 16 bytes carry data; the rest is reserved. A search never
/// consults the header, it relies on the fixed layout constants instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Format version
    pub version: u16,
    /// Raw index policy value
    pub index_policy: u16,
    /// Unix timestamp when the file was built
    pub created_at: u32,
    /// Offset of the first segment index record
    pub start_index_ptr: u32,
    /// Offset of the last segment index record
    pub end_index_ptr: u32,
}

impl Header {
    /// Decode a header from a buffer of at least [`HEADER_SIZE`] bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::ShortRead {
                offset: 0,
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        Ok(Self {
            version: read_u16(buf, 0),
            index_policy: read_u16(buf, 2),
            created_at: read_u32(buf, 4),
            start_index_ptr: read_u32(buf, 8),
            end_index_ptr: read_u32(buf, 12),
        })
    }

    /// Encode into a full, zero-padded 256-byte header block.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.version.to_le_bytes());
        buf[2..4].copy_from_slice(&self.index_policy.to_le_bytes());
        buf[4..8].copy_from_slice(&self.created_at.to_le_bytes());
        buf[8..12].copy_from_slice(&self.start_index_ptr.to_le_bytes());
        buf[12..16].copy_from_slice(&self.end_index_ptr.to_le_bytes());
        buf
    }

    /// Get the decoded index policy.
    pub fn policy(&self) -> IndexPolicy {
        IndexPolicy::from_u16(self.index_policy)
    }

    /// Number of segment index records between the start and end pointers.
    pub fn segment_count(&self) -> u32 {
        if self.end_index_ptr < self.start_index_ptr {
            return 0;
        }
        (self.end_index_ptr - self.start_index_ptr) / SEGMENT_INDEX_SIZE as u32 + 1
    }
}

/// Vector index entry (8 bytes): the segment index sub-range for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VectorIndexEntry {
    /// Offset of the first record in the bucket
    pub start_ptr: u32,
    /// Offset of the last record in the bucket (inclusive)
    pub end_ptr: u32,
}

impl VectorIndexEntry {
    /// Byte offset of the bucket entry for `ip`, relative to the vector index start.
    #[inline]
    pub fn relative_offset(ip: u32) -> usize {
        let il0 = ((ip >> 24) & 0xFF) as usize;
        let il1 = ((ip >> 16) & 0xFF) as usize;
        il0 * VECTOR_INDEX_COLS * VECTOR_INDEX_ENTRY_SIZE + il1 * VECTOR_INDEX_ENTRY_SIZE
    }

    /// Absolute file offset of the bucket entry for `ip`.
    #[inline]
    pub fn file_offset(ip: u32) -> u64 {
        VECTOR_INDEX_OFFSET + Self::relative_offset(ip) as u64
    }

    /// Decode from an 8-byte buffer.
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            start_ptr: read_u32(buf, 0),
            end_ptr: read_u32(buf, 4),
        }
    }

    /// Encode to 8 bytes.
    pub fn encode(&self) -> [u8; VECTOR_INDEX_ENTRY_SIZE] {
        let mut buf = [0u8; VECTOR_INDEX_ENTRY_SIZE];
        buf[0..4].copy_from_slice(&self.start_ptr.to_le_bytes());
        buf[4..8].copy_from_slice(&self.end_ptr.to_le_bytes());
        buf
    }

    /// Highest record index in the bucket, or `None` if the pointers are inverted.
    pub fn last_record(&self) -> Option<usize> {
        self.end_ptr
            .checked_sub(self.start_ptr)
            .map(|span| span as usize / SEGMENT_INDEX_SIZE)
    }
}

/// Segment index record (14 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentIndexEntry {
    /// First address of the segment
    pub start_ip: u32,
    /// Last address of the segment (inclusive)
    pub end_ip: u32,
    /// Length of the region payload
    pub data_len: u16,
    /// Offset of the region payload
    pub data_ptr: u32,
}

impl SegmentIndexEntry {
    /// Decode from a 14-byte buffer.
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            start_ip: read_u32(buf, 0),
            end_ip: read_u32(buf, 4),
            data_len: read_u16(buf, 8),
            data_ptr: read_u32(buf, 10),
        }
    }

    /// Encode to 14 bytes.
    pub fn encode(&self) -> [u8; SEGMENT_INDEX_SIZE] {
        let mut buf = [0u8; SEGMENT_INDEX_SIZE];
        buf[0..4].copy_from_slice(&self.start_ip.to_le_bytes());
        buf[4..8].copy_from_slice(&self.end_ip.to_le_bytes());
        buf[8..10].copy_from_slice(&self.data_len.to_le_bytes());
        buf[10..14].copy_from_slice(&self.data_ptr.to_le_bytes());
        buf
    }

    /// Check whether `ip` falls inside this segment.
    #[inline]
    pub fn contains(&self, ip: u32) -> bool {
        self.start_ip <= ip && ip <= self.end_ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(VECTOR_INDEX_LENGTH, 524_288);
        assert_eq!(VECTOR_INDEX_OFFSET, 256);
    }

    #[test]
    fn test_read_u32_is_unsigned() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(read_u32(&buf, 0), u32::MAX);
        assert_eq!(read_u32(&buf, 1), 0x01FF_FFFF);
        assert_eq!(read_u16(&buf, 3), 0x01FF);
    }

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("1.2.3.4").unwrap(), 16909060);
        assert_eq!(parse_ip("0.0.0.0").unwrap(), 0);
        assert_eq!(parse_ip("255.255.255.255").unwrap(), u32::MAX);
        assert_eq!(parse_ip("1.2.3.4").unwrap() >> 24, 1);
    }

    #[test]
    fn test_parse_ip_invalid() {
        for bad in ["1.2.3", "1.2.3.4.5", "999.1.1.1", "", "a.b.c.d", "1..2.3", "256.0.0.0"] {
            match parse_ip(bad) {
                Err(Error::InvalidAddress(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidAddress for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_format_ip_inverts_parse() {
        for ip in ["1.2.3.4", "10.0.0.1", "223.255.0.9", "0.0.0.0"] {
            assert_eq!(format_ip(parse_ip(ip).unwrap()), ip);
        }
    }

    #[test]
    fn test_vector_index_offset() {
        let ip = parse_ip("1.2.3.4").unwrap();
        assert_eq!(VectorIndexEntry::relative_offset(ip), 256 * 8 + 2 * 8);
        assert_eq!(VectorIndexEntry::file_offset(ip), 256 + 256 * 8 + 2 * 8);

        let last = parse_ip("255.255.0.0").unwrap();
        assert_eq!(
            VectorIndexEntry::relative_offset(last),
            VECTOR_INDEX_LENGTH - VECTOR_INDEX_ENTRY_SIZE
        );
    }

    #[test]
    fn test_header_decode() {
        let header = Header {
            version: 3,
            index_policy: 1,
            created_at: 1_700_000_000,
            start_index_ptr: 524_544,
            end_index_ptr: 524_544 + 14 * 9,
        };
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.policy(), IndexPolicy::VectorIndex);
        assert_eq!(decoded.segment_count(), 10);
    }

    #[test]
    fn test_header_decode_short() {
        let err = Header::decode(&[0u8; 100]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead {
                expected: HEADER_SIZE,
                actual: 100,
                ..
            }
        ));
    }

    #[test]
    fn test_index_policy() {
        assert_eq!(IndexPolicy::from_u16(2), IndexPolicy::BTreeIndex);
        assert_eq!(IndexPolicy::from_u16(7), IndexPolicy::Unknown(7));
        assert_eq!(IndexPolicy::Unknown(7).as_u16(), 7);
    }

    #[test]
    fn test_segment_entry_decode() {
        let entry = SegmentIndexEntry {
            start_ip: 0x8000_0000,
            end_ip: 0xFFFF_FFFF,
            data_len: 11,
            data_ptr: 600_000,
        };
        let decoded = SegmentIndexEntry::decode(&entry.encode());
        assert_eq!(decoded, entry);
        assert!(decoded.contains(0x8000_0000));
        assert!(decoded.contains(u32::MAX));
        assert!(!decoded.contains(0x7FFF_FFFF));
    }

    #[test]
    fn test_vector_entry_last_record() {
        let entry = VectorIndexEntry {
            start_ptr: 1000,
            end_ptr: 1000 + 14 * 4,
        };
        assert_eq!(entry.last_record(), Some(4));
        assert_eq!(VectorIndexEntry::decode(&entry.encode()), entry);

        let inverted = VectorIndexEntry {
            start_ptr: 2000,
            end_ptr: 1000,
        };
        assert_eq!(inverted.last_record(), None);
    }
}
