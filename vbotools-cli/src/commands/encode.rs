use anyhow::{anyhow, Context, Result};
use colored::*;
use std::fs;
use tracing::info;
use vbotools_core::{
    encoder::DbnEncoder,
    vbo::{decode_text, find_banner, parse_str},
};

pub fn execute(input: &str, output: &str, comments: &[String]) -> Result<()> {
    info!("Encoding VBO file: {}", input);

    let bytes = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    let text = decode_text(&bytes);

    let banner = find_banner(&text)
        .ok_or_else(|| anyhow!("Input file has no 'File created' banner: {}", input))?;
    let store = parse_str(&text).with_context(|| format!("Failed to parse VBO file: {}", input))?;

    let mut encoder = DbnEncoder::new(banner);
    if !comments.is_empty() {
        encoder = encoder.comments(comments.iter().cloned());
    }

    let bytes = encoder
        .encode(&store)
        .with_context(|| format!("Failed to encode VBO file: {}", input))?;

    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!("Wrote {} bytes", bytes.len());
    println!(
        "{} Encoded {} packets to {}",
        "✓".green(),
        store.data()?.len(),
        output
    );

    Ok(())
}
