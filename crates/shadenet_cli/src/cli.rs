// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments and top-level errors.

use crate::loader::LoadError;
use std::path::{Path, PathBuf};

/// Usage text printed for `--help` and argument errors
pub const USAGE: &str = "\
usage: shadenet <network.ron> [options]

options:
  --registry <registry.ron>  shader registry (default: builtin RenderMan nodes)
  --settings <shadenet.ron>  settings file (default: shadenet.ron next to the network)
  --material <path>          material id (default: /<network file stem>)
  --json                     print committed networks as JSON
  --dump                     print the filtered material network
  --watch                    re-sync whenever the network file changes
  --write-settings <path>    write the effective settings to <path> and exit
  -h, --help                 show this help";

/// Top-level failure of a CLI run
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// An input document could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The settings file could not be loaded
    #[error("Failed to load settings {}: {source}", path.display())]
    Settings {
        /// Settings path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file watcher failed
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Output could not be serialized
    #[error("Failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// The sync finished with errors
    #[error("Sync finished with {0} error(s)")]
    SyncFailed(usize),
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Material network document
    pub network: PathBuf,
    /// Registry document
    pub registry: Option<PathBuf>,
    /// Settings document
    pub settings: Option<PathBuf>,
    /// Material id override
    pub material: Option<String>,
    /// Emit JSON instead of a text summary
    pub json: bool,
    /// Print the network dump
    pub dump: bool,
    /// Keep running and re-sync on change
    pub watch: bool,
    /// Write the effective settings here instead of converting
    pub write_settings: Option<PathBuf>,
    /// Print usage and exit
    pub help: bool,
}

impl CliArgs {
    /// Material id: the override, or `/` followed by the network file stem
    pub fn material_id(&self) -> String {
        if let Some(material) = &self.material {
            return material.clone();
        }
        let stem = self
            .network
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("/{stem}")
    }

    /// Settings path: the explicit one, or `shadenet.ron` beside the network if present
    pub fn settings_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.settings {
            return Some(path.clone());
        }
        let dir = self.network.parent().unwrap_or(Path::new("."));
        let candidate = crate::settings::Settings::settings_file_path(dir);
        candidate.is_file().then_some(candidate)
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a String, CliError> {
    args.get(i + 1)
        .ok_or_else(|| CliError::Usage(format!("missing value for {flag}")))
}

/// Parse arguments (without the program name)
pub fn parse_cli(args: &[String]) -> Result<CliArgs, CliError> {
    let mut cli = CliArgs::default();
    let mut network = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                cli.help = true;
                return Ok(cli);
            }
            "--json" => cli.json = true,
            "--dump" => cli.dump = true,
            "--watch" => cli.watch = true,
            "--registry" => {
                cli.registry = Some(PathBuf::from(value(args, i, "--registry")?));
                i += 1;
            }
            "--settings" => {
                cli.settings = Some(PathBuf::from(value(args, i, "--settings")?));
                i += 1;
            }
            "--write-settings" => {
                cli.write_settings = Some(PathBuf::from(value(args, i, "--write-settings")?));
                i += 1;
            }
            "--material" => {
                cli.material = Some(value(args, i, "--material")?.clone());
                i += 1;
            }
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown argument: {other}")));
            }
            path => {
                if network.is_some() {
                    return Err(CliError::Usage(format!("unexpected extra argument: {path}")));
                }
                network = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    match network {
        Some(network) => cli.network = network,
        None if cli.write_settings.is_some() => {}
        None => return Err(CliError::Usage("missing network file".to_string())),
    }
    Ok(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| (*a).to_string()).collect()
    }

    #[test]
    fn parse_cli_all_options() {
        let cli = parse_cli(&args(&[
            "--registry",
            "nodes.ron",
            "material.ron",
            "--json",
            "--dump",
            "--watch",
            "--settings",
            "s.ron",
            "--material",
            "/World/Mat",
        ]))
        .unwrap();
        assert_eq!(cli.network, PathBuf::from("material.ron"));
        assert_eq!(cli.registry, Some(PathBuf::from("nodes.ron")));
        assert_eq!(cli.settings, Some(PathBuf::from("s.ron")));
        assert!(cli.json && cli.dump && cli.watch);
        assert_eq!(cli.material_id(), "/World/Mat");
    }

    #[test]
    fn parse_cli_defaults_material_to_file_stem() {
        let cli = parse_cli(&args(&["looks/Brick.ron"])).unwrap();
        assert_eq!(cli.material_id(), "/Brick");
        assert!(!cli.json);
    }

    #[test]
    fn parse_cli_rejects_bad_input() {
        assert!(matches!(parse_cli(&args(&[])), Err(CliError::Usage(_))));
        assert!(matches!(parse_cli(&args(&["a.ron", "--registry"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_cli(&args(&["a.ron", "--bogus"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_cli(&args(&["a.ron", "b.ron"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn parse_cli_write_settings_needs_no_network() {
        let cli = parse_cli(&args(&["--write-settings", "shadenet.ron"])).unwrap();
        assert_eq!(cli.write_settings, Some(PathBuf::from("shadenet.ron")));
        assert_eq!(cli.network, PathBuf::new());
    }

    #[test]
    fn parse_cli_help_short_circuits() {
        let cli = parse_cli(&args(&["--help"])).unwrap();
        assert!(cli.help);
    }
}
