//! Revoice CLI - Command-line interface for RVC voice conversion

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use revoice::audio::{AudioLoader, AudioOutput};
use revoice::{AcfPitchEstimator, PipelineConfig, RvcPipeline, VERSION};

/// Revoice - real-time-oriented RVC voice conversion in Rust
#[derive(Parser, Debug)]
#[command(name = "revoice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a WAV file with a pretrained voice model
    Convert {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file path
        #[arg(short, long, default_value = "output.wav")]
        output: PathBuf,

        /// Path to pipeline config file
        #[arg(short, long, default_value = "rvc.yaml")]
        config: PathBuf,

        /// Target speaker id
        #[arg(short, long, default_value = "0")]
        speaker: i64,

        /// Pitch transpose in semitones
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        transpose: i32,

        /// Playback sample rate of the output file
        #[arg(long, default_value = "44100")]
        playback_rate: u32,
    },

    /// Show pipeline configuration
    Info {
        /// Path to pipeline config file
        #[arg(short, long, default_value = "rvc.yaml")]
        config: PathBuf,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    info!("Revoice v{}", VERSION);

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            speaker,
            transpose,
            playback_rate,
        } => {
            let config = PipelineConfig::load(&config)?;

            let pb = create_progress_bar("Loading models...");
            let mut pipeline = RvcPipeline::from_config(&config)?;
            pb.finish_with_message("Models loaded");

            let (samples, _) = AudioLoader::load(&input, config.sample_rate)
                .with_context(|| format!("Failed to load {:?}", input))?;
            info!(
                "Loaded {:?}: {:.2}s at {} Hz",
                input,
                samples.len() as f32 / config.sample_rate as f32,
                config.sample_rate
            );

            let f0 = AcfPitchEstimator::new(revoice::MODEL_INPUT_SAMPLE_RATE);
            let converted = pipeline.convert(&samples, speaker, &f0, transpose)?;

            let slow = pipeline.timings().iter().filter(|t| !t.realtime()).count();
            if slow > 0 {
                info!("{}/{} segments were slower than realtime", slow, pipeline.timings().len());
            }

            AudioOutput::save(&converted, &output, playback_rate, config.sample_rate)?;
            info!("Wrote {:?} at {} Hz", output, playback_rate);

            Ok(())
        }

        Commands::Info { config } => {
            info!("Loading config from {:?}", config);

            if config.exists() {
                let cfg = PipelineConfig::load(&config).context("Failed to load config")?;
                println!("{:#?}", cfg);
            } else {
                eprintln!("Config file not found: {:?}", config);
            }

            Ok(())
        }
    }
}
