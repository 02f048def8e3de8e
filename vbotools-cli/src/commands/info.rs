use anyhow::{Context, Result};
use colored::*;
use tracing::{info, warn};
use vbotools_core::{
    channels::{acceleration, brake_channel},
    constants::channel,
    interval::estimate,
    time::format_lap_time,
    vbo::{detect_separator, parse_file},
};

/// Reference deceleration for the brake channel, in m/s²
pub const DEFAULT_MAX_DECEL: f64 = 9.81;

pub fn execute(input: &str, max_decel: f64) -> Result<()> {
    info!("Inspecting VBO file: {}", input);

    let store =
        parse_file(input).with_context(|| format!("Failed to read input file: {}", input))?;

    println!("\n=== Sections ===");
    for section in store.iter() {
        let name = format!("[{}]", section.name);
        println!("{:<20}{} lines", name, section.lines.len());
    }

    let separator = detect_separator(&store)?;
    let columns = store.columns()?;
    let synced = columns.position(channel::AVI_SYNC_TIME).is_some();

    println!("\n=== Data ===");
    println!("Separator:          {}", separator);
    println!("Channels:           {}", store.header()?.len());
    println!("Data lines:         {}", store.data()?.len());
    println!(
        "Video sync:         {}",
        if synced { "yes".green() } else { "no".normal() }
    );

    match estimate(&store, separator) {
        Ok(interval) => println!("GPS data interval:  {} ms", interval.millis()),
        Err(e) => warn!("Cannot estimate GPS data interval: {}", e),
    }

    let samples = store.samples(separator).unwrap_or_else(|e| {
        warn!("Cannot read samples: {}", e);
        Vec::new()
    });
    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        let accel = acceleration(&samples);
        let brake = brake_channel(&accel, max_decel);
        let top = samples.iter().map(|s| s.speed_kmh).fold(0.0, f64::max);
        let hardest = accel.iter().copied().fold(0.0, f64::min);
        let braking = brake.iter().filter(|&&b| b > 0.0).count();

        println!(
            "Duration:           {}",
            format_lap_time(last.time_ms.saturating_sub(first.time_ms))
        );
        println!("Top speed:          {:.2} km/h", top);
        println!("Peak deceleration:  {:.2} m/s²", hardest.abs());
        println!("Braking samples:    {}", braking);
    }

    println!("\n{} {} parsed", "✓".green(), input);

    Ok(())
}
