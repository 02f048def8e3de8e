//! DBN encoding
//!
//! VBO files may carry fewer channels than a DBN record. The YAW__, YAW_,
//! YAW and SLIP channels are always written as zero, whatever the source
//! holds.

use crate::constants::{
    channel, CENTI_DECIMALS, COORDINATE_DECIMALS, DBN_COMMENTS, DBN_DATA_MARKER,
    DBN_HEADER_CHANNELS, DBN_LINE_BREAK, DBN_RECORD_TRAILER, DBN_FRAME_SIZE,
};
use crate::error::VboError;
use crate::packet::{parse_scaled, DbnPacket};
use crate::time::vbo_time_to_millis;
use crate::types::{field, invalid, ColumnIndex, SectionStore, Separator};
use crate::vbo::{decode_text, detect_separator, find_banner, parse_str};
use bytes::{BufMut, Bytes, BytesMut};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::debug;

/// Largest value the 3-byte time field can hold
const TIME_FIELD_MASK: u32 = 0x00FF_FFFF;

/// Builder for DBN output
pub struct DbnEncoder {
    banner: String,
    comments: Vec<String>,
}

impl DbnEncoder {
    /// Create an encoder that copies `banner` into the DBN header block
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            comments: DBN_COMMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the `[COMMENTS]` lines
    pub fn comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = comments.into_iter().map(Into::into).collect();
        self
    }

    /// Encode the `[data]` lines of `store`
    ///
    /// Every packet is built before the output buffer is returned.
    pub fn encode(&self, store: &SectionStore) -> Result<Bytes, VboError> {
        let packets = packets_from_store(store)?;

        let mut buf = BytesMut::with_capacity(256 + packets.len() * DBN_FRAME_SIZE);
        self.put_header(&mut buf);

        for packet in &packets {
            buf.put_slice(&packet.to_bytes());
            buf.put_slice(DBN_RECORD_TRAILER);
        }

        #[cfg(feature = "logging")]
        debug!("Encoded {} packets ({} bytes)", packets.len(), buf.len());

        Ok(buf.freeze())
    }

    /// Write the ASCII header block, ending with `[DATA]` CR LF '$'
    fn put_header(&self, buf: &mut BytesMut) {
        fn line(buf: &mut BytesMut, text: &str) {
            buf.put_slice(text.as_bytes());
            buf.put_slice(DBN_LINE_BREAK);
        }

        line(buf, &self.banner);
        buf.put_slice(DBN_LINE_BREAK);
        line(buf, "[HEADER]");
        for name in DBN_HEADER_CHANNELS {
            line(buf, name);
        }
        buf.put_slice(DBN_LINE_BREAK);
        line(buf, "[COMMENTS]");
        for comment in &self.comments {
            line(buf, comment);
        }
        buf.put_slice(DBN_DATA_MARKER);
        buf.put_slice(DBN_RECORD_TRAILER);
    }
}

/// Build one packet per `[data]` line
pub fn packets_from_store(store: &SectionStore) -> Result<Vec<DbnPacket>, VboError> {
    let separator = detect_separator(store)?;
    let layout = PacketLayout::resolve(&store.columns()?)?;

    store
        .data()?
        .iter()
        .enumerate()
        .map(|(line, text)| layout.packet(line, text, separator))
        .collect()
}

/// Encode VBO text; the `File created` banner is required
pub fn encode_str(text: &str) -> Result<Bytes, VboError> {
    let banner = find_banner(text)
        .ok_or_else(|| VboError::malformed("<vbo text>", "missing 'File created' banner"))?;
    let store = parse_str(text)?;
    DbnEncoder::new(banner).encode(&store)
}

/// Read a VBO file and encode it as DBN bytes
pub fn encode_file<P: AsRef<Path>>(path: P) -> Result<Bytes, VboError> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).map_err(|e| VboError::malformed(path.display().to_string(), e))?;

    encode_str(&decode_text(&bytes)).map_err(|e| match e {
        VboError::MalformedFile { reason, .. } => {
            VboError::malformed(path.display().to_string(), reason)
        }
        other => other,
    })
}

struct PacketLayout {
    satellites: usize,
    time: usize,
    latitude: usize,
    longitude: usize,
    velocity: usize,
    heading: usize,
    height: usize,
}

impl PacketLayout {
    fn resolve(columns: &ColumnIndex) -> Result<Self, VboError> {
        Ok(Self {
            satellites: columns.require(channel::SATELLITES)?,
            time: columns.require(channel::TIME)?,
            latitude: columns.require(channel::LATITUDE)?,
            longitude: columns.require(channel::LONGITUDE)?,
            velocity: columns.require(channel::VELOCITY)?,
            heading: columns.require(channel::HEADING)?,
            height: columns.require(channel::HEIGHT)?,
        })
    }

    fn packet(&self, line: usize, text: &str, separator: Separator) -> Result<DbnPacket, VboError> {
        let fields = separator.split(text);
        let get = |idx: usize, column: &str| -> Result<String, VboError> {
            let raw = field(&fields, line, idx, column)?;
            Ok(match separator {
                Separator::Comma => raw.to_string(),
                _ => raw.replace(',', "."),
            })
        };
        let scaled = |idx: usize, column: &str, decimals: u32| -> Result<i32, VboError> {
            let raw = get(idx, column)?;
            parse_scaled(&raw, decimals)
                .map(|v| v as i32)
                .ok_or_else(|| invalid(line, column, &raw))
        };

        let sats = get(self.satellites, channel::SATELLITES)?;
        let satellites = sats
            .trim()
            .parse::<u8>()
            .map_err(|_| invalid(line, channel::SATELLITES, &sats))?;

        let time_ms = vbo_time_to_millis(&get(self.time, channel::TIME)?)?;

        Ok(DbnPacket {
            satellites,
            time_cs: (time_ms / 10) as u32 & TIME_FIELD_MASK,
            latitude: scaled(self.latitude, channel::LATITUDE, COORDINATE_DECIMALS)?,
            longitude: scaled(self.longitude, channel::LONGITUDE, COORDINATE_DECIMALS)?
                .wrapping_neg(),
            velocity: scaled(self.velocity, channel::VELOCITY, CENTI_DECIMALS)? as u16,
            heading: scaled(self.heading, channel::HEADING, CENTI_DECIMALS)? as u16,
            height: scaled(self.height, channel::HEIGHT, CENTI_DECIMALS)? as u32,
            yaw: [0; 3],
            slip: 0,
            checksum: 0,
        }
        .seal())
    }
}
