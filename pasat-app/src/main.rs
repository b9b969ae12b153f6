mod app;
mod voice;

use anyhow::{Context, Result};
use clap::Parser;
use pasat_core::{InputMode, Millis};
use pasat_experiment::DrillConfig;
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub use app::App;

#[derive(Parser, Debug)]
#[command(name = "pasat", about = "Paced serial addition drill in the terminal")]
struct Cli {
    /// TOML file with drill settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Add the digit heard this many presentations back
    #[arg(long)]
    nback: Option<usize>,
    /// Starting inter-stimulus interval in milliseconds
    #[arg(long)]
    isi: Option<Millis>,
    #[arg(long)]
    minutes: Option<u64>,
    /// Keep the interval fixed instead of adapting it
    #[arg(long)]
    manual: bool,
    /// Confirm each answer with Enter instead of live matching
    #[arg(long)]
    selection: bool,
    #[arg(long)]
    error_beep: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "pasat-results.json")]
    results: PathBuf,
    #[arg(long, default_value = "pasat.log")]
    log: PathBuf,
}

impl Cli {
    fn drill_config(&self) -> Result<DrillConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DrillConfig::default(),
        };
        if let Some(nback) = self.nback {
            config.nback_distance = nback;
        }
        if let Some(isi) = self.isi {
            config.initial_isi_ms = isi;
        }
        if let Some(minutes) = self.minutes {
            config.session_duration_seconds = minutes * 60;
        }
        if self.manual {
            config.manual_mode = true;
        }
        if self.selection {
            config.input_mode = InputMode::Selection;
        }
        if self.error_beep {
            config.error_beep = true;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().context("invalid drill settings")?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<DrillConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn init_tracing(log_path: &Path) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        // stdout belongs to the drill
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    let config = cli.drill_config()?;

    let app = App::new(config, cli.results)?;
    app.run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "pasat",
            "--nback",
            "2",
            "--isi",
            "2500",
            "--minutes",
            "5",
            "--selection",
            "--seed",
            "9",
        ]);
        let config = cli.drill_config().unwrap();
        assert_eq!(config.nback_distance, 2);
        assert_eq!(config.initial_isi_ms, 2500);
        assert_eq!(config.session_duration_seconds, 300);
        assert_eq!(config.input_mode, InputMode::Selection);
        assert_eq!(config.seed, Some(9));
        assert!(!config.manual_mode);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let cli = Cli::parse_from(["pasat", "--nback", "11"]);
        assert!(cli.drill_config().is_err());
    }

    #[test]
    fn toml_config_is_loaded() {
        let path = std::env::temp_dir().join("pasat-app-config-test.toml");
        fs::write(
            &path,
            "nback_distance = 3\nmin_isi_ms = 1500\ninput_mode = \"selection\"\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(config.nback_distance, 3);
        assert_eq!(config.min_isi_ms, 1500);
        assert_eq!(config.input_mode, InputMode::Selection);
        assert_eq!(config.initial_isi_ms, 3000);
    }
}
