//! xdb fixture builder shared by the unit and integration tests.
//!
//! Lays out a file the way the production builder does: header, vector
//! index, payloads, then segment records split at /16 boundaries so every
//! record belongs to exactly one bucket. Buckets with no records point at a
//! sentinel record that matches nothing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

const HEADER_SIZE: usize = 256;
const VECTOR_INDEX_LENGTH: usize = 256 * 256 * 8;
const SEGMENT_INDEX_SIZE: usize = 14;

/// Builder for synthetic xdb files.
#[derive(Debug, Default)]
pub struct XdbBuilder {
    segments: Vec<(u32, u32, Vec<u8>)>,
    created_at: u32,
}

impl XdbBuilder {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            created_at: 1_700_000_000,
        }
    }

    /// Add a segment given as dotted-decimal bounds.
    pub fn add(self, start: &str, end: &str, region: &str) -> Self {
        let start: Ipv4Addr = start.parse().expect("valid start address");
        let end: Ipv4Addr = end.parse().expect("valid end address");
        self.add_range(start.into(), end.into(), region.as_bytes())
    }

    /// Add a segment given as numeric bounds.
    pub fn add_range(mut self, start: u32, end: u32, region: &[u8]) -> Self {
        assert!(start <= end, "segment bounds are inverted");
        self.segments.push((start, end, region.to_vec()));
        self
    }

    /// Segments covering the whole address space, one per first octet.
    pub fn full_coverage() -> Self {
        (0u32..256).fold(Self::new(), |builder, octet| {
            let start = octet << 24;
            let end = start | 0x00FF_FFFF;
            let region = format!("C{}|0|P{}|City{}|ISP{}", octet, octet, octet, octet % 7);
            builder.add_range(start, end, region.as_bytes())
        })
    }

    pub fn build(&self) -> Vec<u8> {
        let mut segments = self.segments.clone();
        segments.sort_by_key(|(start, _, _)| *start);

        let mut data = vec![0u8; HEADER_SIZE + VECTOR_INDEX_LENGTH];

        // Payloads
        let mut payload_ptrs = Vec::with_capacity(segments.len());
        for (_, _, region) in &segments {
            payload_ptrs.push(data.len() as u32);
            data.extend_from_slice(region);
        }

        // Sentinel record for empty buckets
        let sentinel = data.len() as u32;
        push_record(&mut data, u32::MAX, 0, 0, 0);

        // Segment records, split per bucket
        let mut buckets: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
        let mut first_record = None;
        let mut last_record = sentinel;
        for ((start, end, region), data_ptr) in segments.iter().zip(&payload_ptrs) {
            let mut s = *start;
            loop {
                let piece_end = (*end).min(s | 0xFFFF);
                let ptr = data.len() as u32;
                push_record(&mut data, s, piece_end, region.len() as u16, *data_ptr);

                let bucket = buckets.entry(s >> 16).or_insert((ptr, ptr));
                bucket.1 = ptr;
                first_record.get_or_insert(ptr);
                last_record = ptr;

                if piece_end == *end {
                    break;
                }
                s = piece_end + 1;
            }
        }

        // Vector index
        for bucket in 0u32..65536 {
            let (s_ptr, e_ptr) = buckets.get(&bucket).copied().unwrap_or((sentinel, sentinel));
            let offset = HEADER_SIZE + bucket as usize * 8;
            data[offset..offset + 4].copy_from_slice(&s_ptr.to_le_bytes());
            data[offset + 4..offset + 8].copy_from_slice(&e_ptr.to_le_bytes());
        }

        // Header
        data[0..2].copy_from_slice(&3u16.to_le_bytes());
        data[2..4].copy_from_slice(&1u16.to_le_bytes());
        data[4..8].copy_from_slice(&self.created_at.to_le_bytes());
        data[8..12].copy_from_slice(&first_record.unwrap_or(sentinel).to_le_bytes());
        data[12..16].copy_from_slice(&last_record.to_le_bytes());

        data
    }
}

fn push_record(data: &mut Vec<u8>, start: u32, end: u32, data_len: u16, data_ptr: u32) {
    let before = data.len();
    data.extend_from_slice(&start.to_le_bytes());
    data.extend_from_slice(&end.to_le_bytes());
    data.extend_from_slice(&data_len.to_le_bytes());
    data.extend_from_slice(&data_ptr.to_le_bytes());
    debug_assert_eq!(data.len() - before, SEGMENT_INDEX_SIZE);
}

/// The minimal file from the format description: zeroed header, one bucket
/// (1, 2) pointing at a single record for 1.2.3.4, every other bucket zero.
pub fn minimal_file() -> Vec<u8> {
    let payload = b"CN|0|ZJ|HZ";
    let mut data = vec![0u8; HEADER_SIZE + VECTOR_INDEX_LENGTH];

    let record_ptr = data.len() as u32;
    let data_ptr = record_ptr + SEGMENT_INDEX_SIZE as u32;
    push_record(&mut data, 16909060, 16909060, payload.len() as u16, data_ptr);
    data.extend_from_slice(payload);

    let offset = HEADER_SIZE + 256 * 8 + 2 * 8;
    data[offset..offset + 4].copy_from_slice(&record_ptr.to_le_bytes());
    data[offset + 4..offset + 8].copy_from_slice(&record_ptr.to_le_bytes());

    data
}
