use anyhow::{Context, Result};
use colored::*;
use std::fs;
use tracing::info;
use vbotools_core::{decoder::decode_bytes, vbo::VboWriter};

pub fn execute(input: &str, output: &str) -> Result<()> {
    info!("Decoding DBN file: {}", input);

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;

    let store =
        decode_bytes(&data).with_context(|| format!("Failed to decode DBN file: {}", input))?;
    let lines = store.data().map(|d| d.len()).unwrap_or(0);

    VboWriter::new()
        .write(&store, output)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!(
        "{} Decoded {} packets to {}",
        "✓".green(),
        lines,
        output
    );

    Ok(())
}
