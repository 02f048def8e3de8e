//! DBN decoding (strict mode)
//!
//! Any checksum mismatch aborts the whole decode: once one frame is corrupt
//! the frame boundaries after it cannot be trusted.

use crate::checksum::crc16;
use crate::constants::{
    COLUMN_NAMES_SECTION, COMMENTS_SECTION, DATA_SECTION, DBN_PAYLOAD_SIZE, DBN_VBO_COLUMN_NAMES,
    DBN_VBO_COMMENT, DBN_VBO_HEADER, HEADER_SECTION,
};
use crate::error::VboError;
use crate::packet::DbnPacket;
use crate::scanner::locate_data_block;
use crate::time::millis_to_vbo_time;
use crate::types::SectionStore;
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Decode and verify every packet of a DBN stream
pub fn decode_packets(data: &[u8]) -> Result<Vec<DbnPacket>, VboError> {
    let block = locate_data_block(data)
        .ok_or_else(|| VboError::malformed("<dbn stream>", "missing [DATA] marker"))?;

    #[cfg(feature = "logging")]
    debug!(
        "Found [DATA] at offset {}, {} frames",
        block.marker_offset,
        block.frame_count()
    );

    let mut packets = Vec::with_capacity(block.frame_count());
    for frame in block.frames() {
        let packet = DbnPacket::from_bytes(frame.packet);
        let actual = crc16(&frame.packet[..DBN_PAYLOAD_SIZE]);
        if actual != packet.checksum {
            return Err(VboError::ChecksumMismatch {
                frame: frame.index,
                expected: packet.checksum,
                actual,
            });
        }

        #[cfg(feature = "logging")]
        if !frame.has_valid_trailer() {
            warn!(
                "Frame {} at offset {} has unexpected trailer {:?}",
                frame.index, frame.offset, frame.trailer
            );
        }

        packets.push(packet);
    }

    #[cfg(feature = "logging")]
    if block.remainder() > 0 {
        debug!("Ignoring {} trailing bytes after the last frame", block.remainder());
    }

    Ok(packets)
}

/// Decode a DBN stream into a VBO [`SectionStore`]
pub fn decode_bytes(data: &[u8]) -> Result<SectionStore, VboError> {
    let packets = decode_packets(data)?;
    Ok(packets_to_store(&packets))
}

/// Read and decode a DBN file
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<SectionStore, VboError> {
    let path = path.as_ref();
    let data =
        std::fs::read(path).map_err(|e| VboError::malformed(path.display().to_string(), e))?;
    decode_bytes(&data)
}

/// Build the VBO sections for a list of packets
pub fn packets_to_store(packets: &[DbnPacket]) -> SectionStore {
    let mut store = SectionStore::new();
    store.insert(
        HEADER_SECTION,
        DBN_VBO_HEADER.iter().map(|s| s.to_string()).collect(),
    );
    store.insert(COMMENTS_SECTION, vec![DBN_VBO_COMMENT.to_string()]);
    store.insert(COLUMN_NAMES_SECTION, vec![DBN_VBO_COLUMN_NAMES.to_string()]);
    store.insert(DATA_SECTION, packets.iter().map(format_data_line).collect());
    store
}

/// Render one packet as a space-separated VBO data line
pub fn format_data_line(packet: &DbnPacket) -> String {
    let [yaw2, yaw1, yaw, slip] = packet.aux_channels();
    format!(
        "{:03} {} {} {} {} {} {} {} {} {} {}",
        packet.satellites,
        millis_to_vbo_time(packet.time_ms()),
        fixed(packet.latitude_minutes(), 5, 8),
        fixed(packet.longitude_minutes(), 5, 8),
        fixed(packet.velocity_kmh(), 4, 4),
        fixed(packet.heading_deg(), 4, 4),
        fixed(packet.height_m(), 4, 4),
        fixed(yaw2, 4, 4),
        fixed(yaw1, 4, 4),
        fixed(yaw, 4, 4),
        fixed(slip, 4, 4),
    )
}

/// Zero-padded fixed-point rendering; the sign does not count toward the integer digits
fn fixed(value: f64, int_digits: usize, frac_digits: usize) -> String {
    let width = int_digits + 1 + frac_digits;
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{:0width$.frac_digits$}", value.abs())
}
