use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vbotools_cli::commands::{self, info::DEFAULT_MAX_DECEL, route::Canvas, sync::SyncOptions};

#[derive(Parser)]
#[command(name = "vbotools")]
#[command(about = "vbotools - VBO/DBN GPS telemetry conversion and video synchronization", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a DBN file to VBO
    Decode {
        /// Input DBN file
        #[arg(short, long)]
        input: String,

        /// Output VBO file
        #[arg(short, long)]
        output: String,
    },

    /// Convert a VBO file to DBN
    Encode {
        /// Input VBO file
        #[arg(short, long)]
        input: String,

        /// Output DBN file
        #[arg(short, long)]
        output: String,

        /// Comment line for the DBN header (repeatable)
        #[arg(long = "comment")]
        comments: Vec<String>,
    },

    /// Add video synchronization columns to a VBO file
    Sync {
        /// Input VBO file
        #[arg(short, long)]
        input: String,

        /// Output VBO file
        #[arg(short, long)]
        output: String,

        /// Video file (mp4 or avi)
        #[arg(long)]
        video: String,

        /// Telemetry start relative to the video start, in milliseconds
        #[arg(long, allow_hyphen_values = true)]
        offset: i32,

        /// Session name (defaults to the input file name)
        #[arg(long)]
        session: Option<String>,

        /// Fail if the input is already synchronized
        #[arg(long)]
        strict: bool,

        /// GPS data interval in ms (1000, 200, 100 or 50) instead of estimating it
        #[arg(long)]
        interval: Option<u32>,
    },

    /// Extract the traveled route as JSON
    Route {
        /// Input VBO file
        #[arg(short, long)]
        input: String,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Project onto a canvas of this width in pixels
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Canvas height in pixels
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Canvas padding in pixels
        #[arg(long, default_value = "50")]
        padding: u32,
    },

    /// Show a summary of a VBO file
    Info {
        /// Input VBO file
        #[arg(short, long)]
        input: String,

        /// Reference deceleration for the brake channel, in m/s²
        #[arg(long, default_value_t = DEFAULT_MAX_DECEL)]
        max_decel: f64,
    },

    /// List the raw packets of a DBN file
    Packets {
        /// Input DBN file
        #[arg(short, long)]
        input: String,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<String>,

        /// Only show the first N packets
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Decode { input, output } => commands::decode::execute(&input, &output),

        Commands::Encode {
            input,
            output,
            comments,
        } => commands::encode::execute(&input, &output, &comments),

        Commands::Sync {
            input,
            output,
            video,
            offset,
            session,
            strict,
            interval,
        } => commands::sync::execute(&SyncOptions {
            input: &input,
            output: &output,
            video: &video,
            offset_ms: offset,
            session: session.as_deref(),
            strict,
            interval_ms: interval,
        }),

        Commands::Route {
            input,
            output,
            width,
            height,
            padding,
        } => {
            let canvas = width.zip(height).map(|(width, height)| Canvas {
                width,
                height,
                padding,
            });
            commands::route::execute(&input, output.as_deref(), canvas)
        }

        Commands::Info { input, max_decel } => commands::info::execute(&input, max_decel),

        Commands::Packets {
            input,
            output,
            limit,
        } => commands::packets::execute(&input, output.as_deref(), limit),
    }
}
