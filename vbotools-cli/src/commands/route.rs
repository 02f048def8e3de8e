use anyhow::{Context, Result};
use colored::*;
use std::fs;
use tracing::info;
use vbotools_core::{extract_route, time::format_lap_time};

/// Canvas for projected output
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Minimum margin on each side in pixels
    pub padding: u32,
}

pub fn execute(input: &str, output: Option<&str>, canvas: Option<Canvas>) -> Result<()> {
    info!("Extracting route from: {}", input);

    let route =
        extract_route(input).with_context(|| format!("Failed to extract route: {}", input))?;

    let json = match canvas {
        Some(c) => serde_json::to_string_pretty(&route.project(c.width, c.height, c.padding)),
        None => serde_json::to_string_pretty(route.points()),
    }
    .with_context(|| "Failed to serialize route")?;

    if let Some(output_path) = output {
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;
        info!("Route written to: {}", output_path);
    } else {
        println!("{}", json);
        return Ok(());
    }

    let points = route.points();
    println!("\n=== Route ===");
    println!("Points:             {}", points.len());
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        println!(
            "Duration:           {}",
            format_lap_time(last.time_ms.saturating_sub(first.time_ms))
        );
        println!("GPS data interval:  {} ms", first.interval.millis());
        let top = points.iter().map(|p| p.speed_kmh).fold(0.0, f64::max);
        println!("Top speed:          {:.2} km/h", top);
    }

    if points.is_empty() {
        println!("{} No valid GPS fixes found", "✗".red());
    } else {
        println!("{} Route written to {}", "✓".green(), output.unwrap_or("-"));
    }

    Ok(())
}
