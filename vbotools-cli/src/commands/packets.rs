use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs;
use tracing::info;
use vbotools_core::{decoder::decode_packets, time::millis_to_vbo_time, DbnPacket};

#[derive(Serialize)]
struct PacketDump {
    index: usize,
    time: String,
    checksum: String,
    #[serde(flatten)]
    packet: DbnPacket,
}

pub fn execute(input: &str, output: Option<&str>, limit: Option<usize>) -> Result<()> {
    info!("Reading packets from: {}", input);

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    let packets =
        decode_packets(&data).with_context(|| format!("Failed to decode DBN file: {}", input))?;

    let dump: Vec<PacketDump> = packets
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(index, p)| PacketDump {
            index,
            time: millis_to_vbo_time(p.time_ms()),
            checksum: hex::encode(p.checksum.to_le_bytes()),
            packet: *p,
        })
        .collect();

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&dump)
            .with_context(|| "Failed to serialize packets")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;
        info!("Packets written to: {}", output_path);
    } else {
        println!("=== Packets ===");
        for d in &dump {
            let p = &d.packet;
            println!(
                "#{:<6} {} sats={:<2} lat={:.5} lon={:.5} {:.2} km/h crc={}",
                d.index,
                d.time,
                p.satellites,
                p.latitude_minutes(),
                p.longitude_minutes(),
                p.velocity_kmh(),
                d.checksum
            );
        }
    }

    println!(
        "\n{} {} packets, all checksums valid",
        "✓".green(),
        packets.len()
    );

    Ok(())
}
