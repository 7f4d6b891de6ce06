use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fmdn_decryptor::{protocol::DeviceUpdate, semantic::SemanticPlaces, Decryptor};

/// Decrypt the location reports of a captured device update.
#[derive(Parser)]
struct CliParser {
    /// Hex-encoded account owner key.
    #[arg(long, env = "FMDN_OWNER_KEY", hide_env_values = true)]
    owner_key: String,

    /// Path to a JSON file of known semantic places.
    #[arg(long)]
    semantic_places: Option<PathBuf>,

    /// Path to a JSON-serialized device update.
    device_update: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli_args = CliParser::parse();

    let owner_key =
        hex::decode(cli_args.owner_key.trim()).context("owner key is not valid hex")?;

    let mut decryptor = Decryptor::new(owner_key);
    if let Some(path) = &cli_args.semantic_places {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let places =
            SemanticPlaces::from_json(&json).context("parsing semantic places")?;
        decryptor = decryptor.with_semantic_places(places);
    }

    let json = fs::read_to_string(&cli_args.device_update)
        .with_context(|| format!("reading {}", cli_args.device_update.display()))?;
    let update: DeviceUpdate =
        serde_json::from_str(&json).context("parsing device update")?;

    let locations = decryptor.decrypt_device_update(&update)?;
    if locations.is_empty() {
        println!("no location reports");
        return Ok(());
    }

    for location in locations {
        println!("{location}");
    }

    Ok(())
}
