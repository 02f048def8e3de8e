//! Constants and limits for the VBO and DBN formats

/// Prefix of the banner line every VBO file starts with
pub const BANNER_PREFIX: &str = "File created";

/// Trailer appended to every banner this crate writes
pub const BANNER_SUFFIX: &str = "using vbotools";

/// Section holding the channel names, one per line
pub const HEADER_SECTION: &str = "header";

/// Free-form comments section
pub const COMMENTS_SECTION: &str = "comments";

/// Per-channel units section
pub const CHANNEL_UNITS_SECTION: &str = "channel units";

/// Session metadata written by some loggers (e.g. Harry's LapTimer)
pub const SESSION_DATA_SECTION: &str = "session data";

/// Lap timing section
pub const LAPTIMING_SECTION: &str = "laptiming";

/// Video metadata section (session name + container type)
pub const AVI_SECTION: &str = "avi";

/// Single-line section with the short column names
pub const COLUMN_NAMES_SECTION: &str = "column names";

/// Sample lines
pub const DATA_SECTION: &str = "data";

/// Section order expected by downstream video-analysis consumers
pub const SECTION_ORDER: [&str; 8] = [
    HEADER_SECTION,
    COMMENTS_SECTION,
    CHANNEL_UNITS_SECTION,
    SESSION_DATA_SECTION,
    LAPTIMING_SECTION,
    AVI_SECTION,
    COLUMN_NAMES_SECTION,
    DATA_SECTION,
];

/// Header channel names used by the core
pub mod channel {
    /// UTC time since midnight, `HHMMSS.ss`
    pub const TIME: &str = "time";
    /// Number of satellites in view
    pub const SATELLITES: &str = "satellites";
    /// Latitude in minutes
    pub const LATITUDE: &str = "latitude";
    /// Longitude in minutes
    pub const LONGITUDE: &str = "longitude";
    /// Speed over ground in km/h
    pub const VELOCITY: &str = "velocity kmh";
    /// Heading in degrees
    pub const HEADING: &str = "heading";
    /// Height in metres
    pub const HEIGHT: &str = "height";
    /// Video segment tag column
    pub const AVI_FILE_INDEX: &str = "avifileindex";
    /// Video frame offset column
    pub const AVI_SYNC_TIME: &str = "avisynctime";
}

/// Data lines skipped before sampling timestamps (unstable right after lock)
pub const INTERVAL_SKIP_LINES: usize = 10;

/// Timestamps sampled for interval estimation
pub const INTERVAL_SAMPLE_LINES: usize = 10;

/// Segment tag attached to every synchronized line (one video file per session)
pub const VIDEO_SEGMENT_TAG: &str = "0001";

/// Offset value marking lines recorded before the video started
pub const NO_VIDEO_SYNC_TIME: i64 = -1;

/// Literal `[DATA]` marker that ends the DBN header block
pub const DBN_DATA_MARKER: &[u8; 6] = b"[DATA]";

/// Bytes closing every DBN record (and the `[DATA]` marker): CR LF '$'
pub const DBN_RECORD_TRAILER: &[u8; 3] = b"\r\n$";

/// Line break used inside the DBN header block
pub const DBN_LINE_BREAK: &[u8; 2] = b"\r\n";

/// Size of the checksummed packet payload
pub const DBN_PAYLOAD_SIZE: usize = 28;

/// Size of the packet checksum
pub const DBN_CHECKSUM_SIZE: usize = 2;

/// Payload plus checksum
pub const DBN_PACKET_SIZE: usize = DBN_PAYLOAD_SIZE + DBN_CHECKSUM_SIZE;

/// Packet plus record trailer, the unit read from the stream
pub const DBN_FRAME_SIZE: usize = DBN_PACKET_SIZE + DBN_RECORD_TRAILER.len();

/// Channel list advertised in the DBN `[HEADER]` block, with byte widths
pub const DBN_HEADER_CHANNELS: [&str; 12] = [
    "SATS(1)",
    "TIME(3)",
    "LATITUDE(4)",
    "LONGITUDE(4)",
    "VELOCITY(2)",
    "HEADING(2)",
    "HEIGHT(4)",
    "YAW__(2)",
    "YAW_(2)",
    "YAW(2)",
    "SLIP(2)",
    "CHKSUM(2)",
];

/// VBO `[header]` channel names emitted for a decoded DBN file
pub const DBN_VBO_HEADER: [&str; 11] = [
    "satellites",
    "time",
    "latitude",
    "longitude",
    "velocity kmh",
    "heading",
    "height",
    "YAW__",
    "YAW_",
    "YAW",
    "SLIP",
];

/// VBO `[column names]` line emitted for a decoded DBN file
pub const DBN_VBO_COLUMN_NAMES: &str = "sats time lat long velocity heading height YAW__ YAW_ YAW SLIP";

/// Comment line attached to VBO files produced from DBN input
pub const DBN_VBO_COMMENT: &str = "Converted from .dbn file";

/// Comment lines attached to DBN files produced from VBO input
pub const DBN_COMMENTS: [&str; 1] = ["Converted using vbotools"];

/// Scale of DBN coordinates (1e-5 units)
pub const COORDINATE_DECIMALS: u32 = 5;

/// Scale of DBN velocity, heading and height (0.01 units)
pub const CENTI_DECIMALS: u32 = 2;
