//! Conversions between VBO time strings and milliseconds since midnight

use crate::error::VboError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Convert a logger time (`HHMMSS.ss`, UTC since midnight) to milliseconds
///
/// Only the 9-character centisecond form is accepted. Sampling analysis
/// (interval estimation, samples, route) reads times through this.
pub fn logger_time_to_millis(time: &str) -> Result<u64, VboError> {
    match time.len() {
        9 => parse_time(time, 10),
        _ => Err(VboError::InvalidTimeFormat(time.to_string())),
    }
}

/// Convert a VBO time (UTC since midnight) to milliseconds
///
/// Loggers write `HHMMSS.ss` (centiseconds). Files produced from DBN input
/// carry `HHMMSS.sss` (milliseconds). Anything else is rejected.
pub fn vbo_time_to_millis(time: &str) -> Result<u64, VboError> {
    match time.len() {
        9 => parse_time(time, 10),
        10 => parse_time(time, 1),
        _ => Err(VboError::InvalidTimeFormat(time.to_string())),
    }
}

fn parse_time(time: &str, scale: u64) -> Result<u64, VboError> {
    let bytes = time.as_bytes();
    if bytes[6] != b'.' {
        return Err(VboError::InvalidTimeFormat(time.to_string()));
    }

    let digits = |range: core::ops::Range<usize>| -> Result<u64, VboError> {
        let part = &bytes[range];
        if !part.iter().all(u8::is_ascii_digit) {
            return Err(VboError::InvalidTimeFormat(time.to_string()));
        }
        Ok(part
            .iter()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0')))
    };

    let hh = digits(0..2)?;
    let mm = digits(2..4)?;
    let ss = digits(4..6)?;
    let fraction = digits(7..bytes.len())? * scale;

    Ok(hh * MS_PER_HOUR + mm * MS_PER_MINUTE + ss * MS_PER_SECOND + fraction)
}

/// Render milliseconds since midnight as `HHMMSS.mmm`
pub fn millis_to_vbo_time(millis: u64) -> String {
    let hour = millis / MS_PER_HOUR;
    let minute = (millis % MS_PER_HOUR) / MS_PER_MINUTE;
    let second = (millis % MS_PER_MINUTE) / MS_PER_SECOND;
    let fraction = millis % MS_PER_SECOND;

    format!("{:02}{:02}{:02}.{:03}", hour, minute, second, fraction)
}

/// Render a duration as `mm:ss.SSS` (minutes are not wrapped into hours)
pub fn format_lap_time(millis: u64) -> String {
    let minutes = millis / MS_PER_MINUTE;
    let seconds = (millis % MS_PER_MINUTE) / MS_PER_SECOND;
    let fraction = millis % MS_PER_SECOND;

    format!("{:02}:{:02}.{:03}", minutes, seconds, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centisecond_time() {
        assert_eq!(vbo_time_to_millis("132701.20").unwrap(), 48_421_200);
        assert_eq!(vbo_time_to_millis("000000.01").unwrap(), 10);
    }

    #[test]
    fn test_millisecond_time() {
        assert_eq!(vbo_time_to_millis("132701.205").unwrap(), 48_421_205);
    }

    #[test]
    fn test_invalid_time() {
        for bad in ["", "1327.20", "132701.2", "1327012.20", "13270120.0", "13a701.20", "132701.2x"] {
            assert_eq!(
                vbo_time_to_millis(bad),
                Err(VboError::InvalidTimeFormat(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_logger_time_is_centiseconds_only() {
        assert_eq!(logger_time_to_millis("132701.20").unwrap(), 48_421_200);
        for bad in ["132701.205", "132701.2", "13270120.0", "1327a1.20"] {
            assert_eq!(
                logger_time_to_millis(bad),
                Err(VboError::InvalidTimeFormat(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_millis_to_vbo_time() {
        assert_eq!(millis_to_vbo_time(48_421_200), "132701.200");
        assert_eq!(millis_to_vbo_time(0), "000000.000");
        assert_eq!(millis_to_vbo_time(86_399_999), "235959.999");
    }

    #[test]
    fn test_format_lap_time() {
        assert_eq!(format_lap_time(83_456), "01:23.456");
        assert_eq!(format_lap_time(3_723_004), "62:03.004");
    }
}
