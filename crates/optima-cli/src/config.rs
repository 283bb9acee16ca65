use std::env;
use std::path::Path;

use anyhow::Context as _;
use optima_video::TimingConfig;

/// Load `.env` from the working directory, if present.
pub fn init() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("ignoring unreadable .env file: {err}");
    }
}

/// Returns a non-empty environment variable.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Timing constants: defaults, then the JSON file if given, then
/// `OPTIMA_*` environment overrides.
pub fn load_timing_config(path: Option<&Path>) -> anyhow::Result<TimingConfig> {
    let base = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading timing config {}", path.display()))?;
            TimingConfig::from_json_str(&raw)
                .with_context(|| format!("parsing timing config {}", path.display()))?
        }
        None => TimingConfig::default(),
    };
    base.with_env_overrides()
        .context("applying OPTIMA_* timing overrides")
}
