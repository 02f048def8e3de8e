//! Locating the `[DATA]` block and slicing it into fixed-size frames

use crate::constants::{DBN_DATA_MARKER, DBN_FRAME_SIZE, DBN_PACKET_SIZE, DBN_RECORD_TRAILER};

/// A raw frame found in the data block
#[derive(Debug, Clone, Copy)]
pub struct LocatedFrame<'a> {
    /// Zero-based frame index
    pub index: usize,

    /// Byte offset of the frame in the stream
    pub offset: usize,

    /// Payload plus checksum
    pub packet: &'a [u8; DBN_PACKET_SIZE],

    /// The three bytes that close the frame
    pub trailer: &'a [u8],
}

impl LocatedFrame<'_> {
    /// Whether the frame ends with CR LF '$'
    pub fn has_valid_trailer(&self) -> bool {
        self.trailer == DBN_RECORD_TRAILER
    }
}

/// The frame region of a DBN stream
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    /// Offset of the `[DATA]` marker
    pub marker_offset: usize,

    /// Offset of the first frame
    pub start: usize,

    /// Bytes from the first frame to the end of the stream
    pub bytes: &'a [u8],
}

impl<'a> DataBlock<'a> {
    /// Complete frames in stream order
    pub fn frames(&self) -> impl Iterator<Item = LocatedFrame<'a>> + 'a {
        let start = self.start;
        self.bytes
            .chunks_exact(DBN_FRAME_SIZE)
            .enumerate()
            .filter_map(move |(index, chunk)| {
                let (packet, trailer) = chunk.split_at(DBN_PACKET_SIZE);
                Some(LocatedFrame {
                    index,
                    offset: start + index * DBN_FRAME_SIZE,
                    packet: packet.try_into().ok()?,
                    trailer,
                })
            })
    }

    /// Number of complete frames
    pub fn frame_count(&self) -> usize {
        self.bytes.len() / DBN_FRAME_SIZE
    }

    /// Bytes after the last complete frame (a short read)
    pub fn remainder(&self) -> usize {
        self.bytes.len() % DBN_FRAME_SIZE
    }
}

/// Find the `[DATA]` block by a linear scan of the stream
///
/// The marker is followed by a 3-byte trailer that is skipped whatever its
/// content. Returns `None` when the marker is absent.
pub fn locate_data_block(data: &[u8]) -> Option<DataBlock<'_>> {
    let marker_offset = find_marker(data)?;
    let start = (marker_offset + DBN_DATA_MARKER.len() + DBN_RECORD_TRAILER.len()).min(data.len());

    Some(DataBlock {
        marker_offset,
        start,
        bytes: &data[start..],
    })
}

/// Find the first occurrence of the `[DATA]` marker
fn find_marker(data: &[u8]) -> Option<usize> {
    memchr::memmem::find(data, DBN_DATA_MARKER)
}
