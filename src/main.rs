//! Binary entry point that wires configuration, logging and credentials, then
//! launches the NutriGuide chat loop on a single-threaded runtime.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nutriguide::assistant::{Assistant, Session};
use nutriguide::config::{load_app_config, Credentials, CONFIG_PATH};

/// NutriGuide: ask nutrition questions, share meal photos, or just talk.
#[derive(Debug, Parser)]
#[command(name = "nutriguide", version, about)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Directory that receives nutrition_advice.txt.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Read every reply aloud.
    #[arg(long)]
    speak_replies: bool,

    /// Never open the microphone.
    #[arg(long)]
    no_voice: bool,
}

#[tokio::main(flavor = "current_thread")]
/// Loads `.env`, configuration and credentials, then runs the chat loop.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_app_config(&cli.config);
    config.apply_env_overrides();
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }
    config.speak_replies |= cli.speak_replies;
    config.voice_enabled &= !cli.no_voice;

    let credentials = Credentials::from_env()?;
    let assistant = Assistant::from_config(&config, &credentials);
    assistant.run(Session::new(config.profile.clone())).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nutriguide=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
