use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::wire::Sampling;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub gemini_api_base: String,
    pub openai_api_base: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
    pub data_dir: PathBuf,
    pub export_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-2.5-pro".into(),
            gemini_api_base: "https://generativelanguage.googleapis.com".into(),
            openai_api_base: "https://api.openai.com".into(),
            temperature: 0.8,
            top_p: 0.95,
            timeout_secs: 600,
            data_dir: default_data_dir(),
            export_filename: "content_plan.csv".into(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("content-planner")
}

/// `RUST_LOG` fallback: `info` for this crate, `debug` under `--debug`.
pub fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "content_planner=debug"
    } else {
        "content_planner=info"
    }
}

impl Config {
    /// Defaults, overlaid by an optional TOML file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let raw = fs::read_to_string(p)?;
                toml::from_str(&raw).with_context(|| format!("parsing config {}", p.display()))
            }
        }
    }

    /// Command-line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(d) = &args.data_dir {
            self.data_dir = d.clone();
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
    }

    pub fn sampling(&self) -> Sampling {
        Sampling { temperature: self.temperature, top_p: self.top_p }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(default_log_filter(false), "content_planner=info");
        assert_eq!(default_log_filter(true), "content_planner=debug");
    }

    #[test]
    fn file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("planner.toml");
        fs::write(&p, "provider = \"openai\"\nmodel = \"gpt-4.1-mini\"\ntemperature = 0.5\n").unwrap();

        let cfg = Config::load(Some(&p)).unwrap();
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
        assert_eq!(cfg.model, "gpt-4.1-mini");
        assert_eq!(cfg.temperature, 0.5);
        assert_eq!(cfg.top_p, 0.95);
        assert_eq!(cfg.export_filename, "content_plan.csv");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.toml");
        fs::write(&p, "temperature = \"hot\"").unwrap();
        assert!(Config::load(Some(&p)).is_err());
    }
}
