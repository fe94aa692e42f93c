//! Host configuration: JSON file plus command line overrides

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::Result;
use crate::simulation::ReclaimPolicy;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "snowfall.json";

/// Window and buffer settings for the SDL host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub reclaim: ReclaimPolicy,
    /// Extra bytes appended to every bitmap row
    pub pitch_padding: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            reclaim: ReclaimPolicy::Never,
            pitch_padding: 0,
        }
    }
}

impl HostConfig {
    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load config if the file exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading config from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Command line flags win over the file
    pub fn apply(&mut self, args: &CliArgs) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if args.no_vsync {
            self.vsync = false;
        }
        if args.reclaim {
            self.reclaim = ReclaimPolicy::OnExpiry;
        }
    }
}

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub no_vsync: bool,
    pub reclaim: bool,
    pub config: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name); unknown or malformed flags are ignored
    pub fn parse(args: &[String]) -> Self {
        let mut out = Self::default();
        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--no-vsync" => out.no_vsync = true,
                "--reclaim" => out.reclaim = true,
                "--help" => out.help = true,
                "--width" | "-w" => {
                    out.width = value.and_then(|v| v.parse().ok()).or(out.width);
                    i += 1;
                },
                "--height" | "-h" => {
                    out.height = value.and_then(|v| v.parse().ok()).or(out.height);
                    i += 1;
                },
                "--resolution" | "-r" => {
                    // WxH format (e.g., 1920x1080)
                    if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                        if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                            out.width = Some(w);
                            out.height = Some(h);
                        }
                    }
                    i += 1;
                },
                "--config" | "-c" => {
                    if let Some(path) = value {
                        out.config = Some(PathBuf::from(path));
                    }
                    i += 1;
                },
                _ => {},
            }
            i += 1;
        }
        out
    }

    pub fn usage() -> String {
        format!(
            "Usage: snowfall [OPTIONS]\n\
             \n\
             Options:\n\
             \x20 --width W, -w W           Set window width (default: {})\n\
             \x20 --height H, -h H          Set window height (default: {})\n\
             \x20 --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)\n\
             \x20 --no-vsync                Disable VSync for uncapped framerate\n\
             \x20 --reclaim                 Return expired particles to the pool\n\
             \x20 --config PATH, -c PATH    Config file (default: {})\n\
             \x20 --help                    Show this help message",
            DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_CONFIG_PATH
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let cli = CliArgs::parse(&args(&["-w", "800", "--height", "600", "--no-vsync", "--reclaim"]));
        assert_eq!(cli.width, Some(800));
        assert_eq!(cli.height, Some(600));
        assert!(cli.no_vsync);
        assert!(cli.reclaim);
        assert!(!cli.help);
    }

    #[test]
    fn test_parse_resolution_and_config() {
        let cli = CliArgs::parse(&args(&["-r", "1920x1080", "--config", "snow.json"]));
        assert_eq!((cli.width, cli.height), (Some(1920), Some(1080)));
        assert_eq!(cli.config, Some(PathBuf::from("snow.json")));
    }

    #[test]
    fn test_parse_ignores_malformed_values() {
        let cli = CliArgs::parse(&args(&["-w", "wide", "-r", "10by10", "--bogus", "--width"]));
        assert_eq!(cli, CliArgs::default());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = HostConfig::default();
        config.apply(&CliArgs {
            width: Some(320),
            no_vsync: true,
            reclaim: true,
            ..CliArgs::default()
        });
        assert_eq!(config.width, 320);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(!config.vsync);
        assert_eq!(config.reclaim, ReclaimPolicy::OnExpiry);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snowfall.json");
        fs::write(&path, r#"{ "width": 100, "reclaim": "on_expiry" }"#).unwrap();

        let config = HostConfig::load(&path).unwrap();
        assert_eq!(config.width, 100);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(config.vsync);
        assert_eq!(config.reclaim, ReclaimPolicy::OnExpiry);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let config = HostConfig {
            pitch_padding: 16,
            ..HostConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(HostConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(HostConfig::load(&missing), Err(Error::Io(_))));
        assert_eq!(HostConfig::load_or_default(&missing).unwrap(), HostConfig::default());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ width: }").unwrap();
        assert!(matches!(HostConfig::load(&bad), Err(Error::Config(_))));
    }
}
