//! # vbotools Core
//!
//! Conversion between VBO text and DBN binary GPS telemetry logs, plus
//! video synchronization metadata for VBO files.
//!
//! ## Modules
//!
//! - `constants`: Section names, channel names and DBN layout constants
//! - `types`: Core types (SectionStore, Separator, ColumnIndex, GpsSample)
//! - `time`: VBO time strings
//! - `vbo`: VBO section parser, separator detection and writer
//! - `interval`: GPS sampling interval estimation
//! - `sync`: Video synchronization columns
//! - `packet`: DBN packet layout
//! - `checksum`: The logger's CRC-16
//! - `scanner`: `[DATA]` block location and framing
//! - `decoder`: DBN decoding
//! - `encoder`: DBN encoding
//! - `route`: Traveled route extraction and projection
//! - `channels`: Derived acceleration and brake channels
//!
//! Every function below reads its whole input, transforms it in memory and
//! only then writes output, so a failure never leaves a partial file.

#![warn(missing_docs)]

pub mod channels;
pub mod checksum;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod interval;
pub mod packet;
pub mod route;
pub mod scanner;
pub mod sync;
pub mod time;
pub mod types;
pub mod vbo;

use std::path::Path;

// Re-export commonly used types
pub use error::VboError;
pub use interval::GpsDataInterval;
pub use packet::DbnPacket;
pub use route::{Route, RoutePixel, RoutePoint};
pub use sync::{SyncMode, VideoContainer, VideoSync};
pub use types::{GpsSample, SectionStore, Separator};
pub use vbo::VboWriter;

/// Result type alias for vbotools operations
pub type Result<T> = core::result::Result<T, VboError>;

/// Parse a VBO file
pub fn parse_vbo_file<P: AsRef<Path>>(path: P) -> Result<SectionStore> {
    vbo::parse_file(path)
}

/// Estimate the sampling interval of a parsed VBO file
pub fn estimate_gps_interval(store: &SectionStore) -> Result<GpsDataInterval> {
    let separator = vbo::detect_separator(store)?;
    interval::estimate(store, separator)
}

/// Parse a VBO file and extract its traveled route
pub fn extract_route<P: AsRef<Path>>(path: P) -> Result<Route> {
    let store = vbo::parse_file(path)?;
    Route::extract(&store)
}

/// Add video sync columns to `store`
///
/// Existing sync columns are replaced. Use [`VideoSync`] directly for
/// strict mode or a fixed interval.
pub fn inject_video_sync(
    mut store: SectionStore,
    offset_ms: i32,
    session_name: &str,
    container: VideoContainer,
) -> Result<SectionStore> {
    VideoSync::new(offset_ms, session_name, container).align(&mut store)?;
    Ok(store)
}

/// Write a store as a VBO file with the standard section order
pub fn write_vbo<P: AsRef<Path>>(store: &SectionStore, path: P) -> Result<()> {
    vbo::write_file(store, path)
}

/// Convert a DBN file to a VBO file
pub fn decode_dbn_to_vbo<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let store = decoder::decode_file(input)?;
    vbo::write_file(&store, output)
}

/// Convert a VBO file to a DBN file
pub fn encode_vbo_to_dbn<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let bytes = encoder::encode_file(input)?;
    std::fs::write(output, &bytes)?;
    Ok(())
}
