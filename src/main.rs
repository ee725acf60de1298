use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use diffbot_runtime::DriveConfig;

#[derive(Parser)]
#[command(about = "Differential-drive locomotion runtime")]
struct Args {
    /// Path to a JSON config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against the simulated base regardless of config
    #[arg(long)]
    sim: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let mut cfg = match args.config {
        Some(path) => match DriveConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => DriveConfig::default(),
    };
    if args.sim {
        cfg.motor_enabled = false;
    }

    if let Err(e) = diffbot_runtime::runtime::run(cfg).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
