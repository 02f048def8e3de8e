//! DBN packet layout and field packing
//!
//! A packet is 30 bytes: a 28-byte payload followed by its 2-byte checksum.
//!
//! | offset | size | field                                    |
//! |--------|------|------------------------------------------|
//! | 0      | 1    | satellites                               |
//! | 1      | 3    | time, centiseconds since midnight        |
//! | 4      | 4    | latitude, signed, 1e-5 minutes           |
//! | 8      | 4    | longitude, signed, 1e-5 minutes, negated |
//! | 12     | 2    | velocity, 0.01 km/h                      |
//! | 14     | 2    | heading, 0.01 deg                        |
//! | 16     | 4    | height, 0.01 m                           |
//! | 20     | 2×4  | YAW__, YAW_, YAW, SLIP, signed, 0.1      |
//! | 28     | 2    | checksum                                 |
//!
//! Multi-byte fields are little-endian.

use crate::checksum::crc16;
use crate::constants::{DBN_PACKET_SIZE, DBN_PAYLOAD_SIZE};
use serde::{Deserialize, Serialize};

/// One decoded DBN record in raw logger units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbnPacket {
    /// Satellites in view
    pub satellites: u8,
    /// Centiseconds since midnight (24 bits)
    pub time_cs: u32,
    /// Latitude in 1e-5 minutes
    pub latitude: i32,
    /// Longitude in 1e-5 minutes, sign inverted relative to VBO
    pub longitude: i32,
    /// Velocity in 0.01 km/h
    pub velocity: u16,
    /// Heading in 0.01 degrees
    pub heading: u16,
    /// Height in 0.01 m
    pub height: u32,
    /// YAW__, YAW_ and YAW channels in 0.1 units
    pub yaw: [i16; 3],
    /// SLIP channel in 0.1 units
    pub slip: i16,
    /// Stored checksum
    pub checksum: u16,
}

impl DbnPacket {
    /// Read a packet without verifying its checksum
    pub fn from_bytes(bytes: &[u8; DBN_PACKET_SIZE]) -> Self {
        Self {
            satellites: bytes[0],
            time_cs: unpack_u24_le([bytes[1], bytes[2], bytes[3]]),
            latitude: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            longitude: i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            velocity: u16::from_le_bytes([bytes[12], bytes[13]]),
            heading: u16::from_le_bytes([bytes[14], bytes[15]]),
            height: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            yaw: [
                i16::from_le_bytes([bytes[20], bytes[21]]),
                i16::from_le_bytes([bytes[22], bytes[23]]),
                i16::from_le_bytes([bytes[24], bytes[25]]),
            ],
            slip: i16::from_le_bytes([bytes[26], bytes[27]]),
            checksum: u16::from_le_bytes([bytes[28], bytes[29]]),
        }
    }

    /// The 28 checksummed payload bytes
    pub fn payload(&self) -> [u8; DBN_PAYLOAD_SIZE] {
        let mut out = [0u8; DBN_PAYLOAD_SIZE];
        out[0] = self.satellites;
        out[1..4].copy_from_slice(&pack_u24_le(self.time_cs));
        out[4..8].copy_from_slice(&self.latitude.to_le_bytes());
        out[8..12].copy_from_slice(&self.longitude.to_le_bytes());
        out[12..14].copy_from_slice(&self.velocity.to_le_bytes());
        out[14..16].copy_from_slice(&self.heading.to_le_bytes());
        out[16..20].copy_from_slice(&self.height.to_le_bytes());
        out[20..22].copy_from_slice(&self.yaw[0].to_le_bytes());
        out[22..24].copy_from_slice(&self.yaw[1].to_le_bytes());
        out[24..26].copy_from_slice(&self.yaw[2].to_le_bytes());
        out[26..28].copy_from_slice(&self.slip.to_le_bytes());
        out
    }

    /// Payload followed by the stored checksum
    pub fn to_bytes(&self) -> [u8; DBN_PACKET_SIZE] {
        let mut out = [0u8; DBN_PACKET_SIZE];
        out[..DBN_PAYLOAD_SIZE].copy_from_slice(&self.payload());
        out[DBN_PAYLOAD_SIZE..].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// Checksum of the current payload
    pub fn computed_checksum(&self) -> u16 {
        crc16(&self.payload())
    }

    /// Store the checksum of the current payload
    pub fn seal(mut self) -> Self {
        self.checksum = self.computed_checksum();
        self
    }

    /// Milliseconds since midnight
    pub fn time_ms(&self) -> u64 {
        u64::from(self.time_cs) * 10
    }

    /// Latitude in VBO minutes
    pub fn latitude_minutes(&self) -> f64 {
        f64::from(self.latitude) / 100_000.0
    }

    /// Longitude in VBO minutes (sign restored)
    pub fn longitude_minutes(&self) -> f64 {
        -(f64::from(self.longitude) / 100_000.0)
    }

    /// Velocity in km/h
    pub fn velocity_kmh(&self) -> f64 {
        f64::from(self.velocity) / 100.0
    }

    /// Heading in degrees
    pub fn heading_deg(&self) -> f64 {
        f64::from(self.heading) / 100.0
    }

    /// Height in metres
    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 100.0
    }

    /// YAW__, YAW_, YAW and SLIP in channel units
    pub fn aux_channels(&self) -> [f64; 4] {
        [
            f64::from(self.yaw[0]) / 10.0,
            f64::from(self.yaw[1]) / 10.0,
            f64::from(self.yaw[2]) / 10.0,
            f64::from(self.slip) / 10.0,
        ]
    }
}

/// Low three bytes of `value`, little-endian; the most significant byte is dropped
pub fn pack_u24_le(value: u32) -> [u8; 3] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2]]
}

/// Assemble a 3-byte little-endian unsigned value
pub fn unpack_u24_le(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

/// Scale a decimal string by `10^decimals`, truncating toward zero
///
/// Works on the text directly so `0.29` scales to exactly `29`. Returns
/// `None` for anything that is not a plain decimal number or that overflows.
pub fn parse_scaled(text: &str, decimals: u32) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut value: i64 = 0;
    for b in int_part.bytes() {
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }
    let mut frac = frac_part.bytes();
    for _ in 0..decimals {
        let digit = frac.next().map_or(0, |b| i64::from(b - b'0'));
        value = value.checked_mul(10)?.checked_add(digit)?;
    }

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DbnPacket {
        DbnPacket {
            satellites: 9,
            time_cs: 4_842_120,
            latitude: 227_925_223,
            longitude: 140_170_107,
            velocity: 8_516,
            heading: 27_512,
            height: 12_345,
            yaw: [-15, 0, 7],
            slip: -3,
            checksum: 0,
        }
        .seal()
    }

    #[test]
    fn test_u24_drops_msb() {
        assert_eq!(pack_u24_le(0x12_34_56_78), [0x78, 0x56, 0x34]);
        assert_eq!(unpack_u24_le([0x78, 0x56, 0x34]), 0x34_56_78);
    }

    #[test]
    fn test_payload_layout() {
        let packet = sample();
        let bytes = packet.to_bytes();

        assert_eq!(bytes[0], 9);
        // 4_842_120 = 0x49_E2_88
        assert_eq!(&bytes[1..4], &[0x88, 0xE2, 0x49]);
        assert_eq!(&bytes[4..8], &227_925_223i32.to_le_bytes());
        assert_eq!(&bytes[12..14], &[0x44, 0x21]);
        assert_eq!(&bytes[20..22], &[0xF1, 0xFF]);
        assert_eq!(&bytes[26..28], &[0xFD, 0xFF]);
        assert_eq!(
            u16::from_le_bytes([bytes[28], bytes[29]]),
            crc16(&bytes[..DBN_PAYLOAD_SIZE])
        );
    }

    #[test]
    fn test_bytes_round_trip() {
        let packet = sample();
        assert_eq!(DbnPacket::from_bytes(&packet.to_bytes()), packet);
    }

    #[test]
    fn test_unit_conversions() {
        let packet = sample();
        assert_eq!(packet.time_ms(), 48_421_200);
        assert_eq!(packet.latitude_minutes(), 2279.25223);
        assert_eq!(packet.longitude_minutes(), -1401.70107);
        assert_eq!(packet.velocity_kmh(), 85.16);
        assert_eq!(packet.heading_deg(), 275.12);
        assert_eq!(packet.height_m(), 123.45);
        assert_eq!(packet.aux_channels(), [-1.5, 0.0, 0.7, -0.3]);
    }

    #[test]
    fn test_parse_scaled_truncates() {
        assert_eq!(parse_scaled("02279.25223", 5), Some(227_925_223));
        assert_eq!(parse_scaled("-01401.70107", 5), Some(-140_170_107));
        assert_eq!(parse_scaled("+0.29", 2), Some(29));
        assert_eq!(parse_scaled("85.1699", 2), Some(8_516));
        assert_eq!(parse_scaled("-0.5", 0), Some(0));
        assert_eq!(parse_scaled("12", 2), Some(1_200));
        assert_eq!(parse_scaled(".5", 1), Some(5));
    }

    #[test]
    fn test_parse_scaled_rejects() {
        assert_eq!(parse_scaled("", 2), None);
        assert_eq!(parse_scaled("-", 2), None);
        assert_eq!(parse_scaled(".", 2), None);
        assert_eq!(parse_scaled("1e5", 2), None);
        assert_eq!(parse_scaled("1.2.3", 2), None);
        assert_eq!(parse_scaled("99999999999999999999", 2), None);
    }
}
