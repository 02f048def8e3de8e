//! CRC-16 variant used by the DBN logger
//!
//! MSB-first, zero initial value, polynomial `0x1024` and no final XOR. The
//! same function generates checksums on encode and verifies them on decode.

/// Polynomial of the logger checksum
pub const DBN_CRC_POLY: u16 = 0x1024;

/// Compute the logger CRC-16 over `data`
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ DBN_CRC_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}
