use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use tracing::info;
use vbotools_core::{
    sync::{format_sync_time, line_offset},
    vbo::{parse_file, VboWriter},
    estimate_gps_interval, GpsDataInterval, SyncMode, VideoContainer, VideoSync,
};

/// Options for the `sync` command
pub struct SyncOptions<'a> {
    /// Input VBO file
    pub input: &'a str,
    /// Output VBO file
    pub output: &'a str,
    /// Video file; only its extension is used
    pub video: &'a str,
    /// Telemetry start relative to the video start, in milliseconds
    pub offset_ms: i32,
    /// Session name for the `[avi]` section (defaults to the input file stem)
    pub session: Option<&'a str>,
    /// Refuse inputs that already carry sync columns
    pub strict: bool,
    /// Fixed sampling interval in milliseconds instead of estimating it
    pub interval_ms: Option<u32>,
}

pub fn execute(opts: &SyncOptions<'_>) -> Result<()> {
    info!("Synchronizing {} with {}", opts.input, opts.video);

    let container = VideoContainer::from_path(opts.video)
        .with_context(|| format!("Cannot use video file: {}", opts.video))?;

    let session = match opts.session {
        Some(name) => name.to_string(),
        None => Path::new(opts.input)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string()),
    };

    let mut store = parse_file(opts.input)
        .with_context(|| format!("Failed to read input file: {}", opts.input))?;

    let interval = match opts.interval_ms {
        Some(ms) => GpsDataInterval::try_from(ms).map_err(anyhow::Error::msg)?,
        None => estimate_gps_interval(&store)
            .with_context(|| format!("Failed to estimate GPS data interval: {}", opts.input))?,
    };

    let mode = if opts.strict {
        SyncMode::Strict
    } else {
        SyncMode::Lenient
    };
    VideoSync::new(opts.offset_ms, session.as_str(), container)
        .mode(mode)
        .interval(interval)
        .align(&mut store)
        .with_context(|| format!("Failed to synchronize: {}", opts.input))?;

    VboWriter::new()
        .write(&store, opts.output)
        .with_context(|| format!("Failed to write output file: {}", opts.output))?;

    let lines = store.data()?.len();
    let skipped = (0..lines)
        .take_while(|&i| line_offset(opts.offset_ms, interval, i) < 0)
        .count();

    println!("\n=== Synchronization ===");
    println!("Session:            {}", session);
    println!("Video container:    {}", container);
    println!("GPS data interval:  {} ms", interval.millis());
    println!(
        "First sync time:    {}",
        format_sync_time(line_offset(opts.offset_ms, interval, skipped))
    );
    println!("Lines w/o video:    {}", skipped);
    println!("\n{} Wrote {} data lines to {}", "✓".green(), lines, opts.output);

    Ok(())
}
