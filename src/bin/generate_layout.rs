use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use signalfield::config::Frequency;
use signalfield::simulation::{LayoutConfig, generate_layout};

#[derive(Parser, Debug)]
#[command(name = "generate_layout")]
#[command(about = "Generate synthetic monitor layouts for coverage testing")]
struct Args {
    /// TOML layout configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of monitors
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Floor plan width in plan units
    #[arg(long)]
    width: Option<f64>,

    /// Floor plan height in plan units
    #[arg(long)]
    height: Option<f64>,

    /// Channels: comma-separated (e.g., "ch1,ch6,ch11" or "2437,5.18GHz")
    #[arg(long)]
    channels: Option<String>,

    /// Fraction of monitors reported offline
    #[arg(long, default_value_t = 0.0)]
    inactive: f64,

    /// Fraction of monitors without a position
    #[arg(long, default_value_t = 0.0)]
    unplaced: f64,
}

fn parse_channels(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<Frequency>()
                .map(|f| f.as_mhz())
                .map_err(|e| anyhow::anyhow!("Invalid channel '{}': {}", p.trim(), e))
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<LayoutConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_toml_config(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(ref channels) = args.channels {
        config.channels = parse_channels(channels)?;
    }
    config.inactive = args.inactive.max(config.inactive);
    config.unplaced = args.unplaced.max(config.unplaced);

    if !(config.width > 0.0 && config.height > 0.0) {
        anyhow::bail!("Layout size must be positive");
    }

    let records = generate_layout(&config);
    log::info!(
        "Generated {} monitors over {}x{} (seed {:?})",
        records.len(),
        config.width,
        config.height,
        config.seed
    );

    let json = serde_json::to_string_pretty(&records)?;
    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?
        }
        None => println!("{}", json),
    }
    Ok(())
}
