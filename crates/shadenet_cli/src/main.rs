// SPDX-License-Identifier: MIT OR Apache-2.0
//! `shadenet` - converts material networks into renderer shading networks.
//!
//! Loads a material network document, syncs it into an in-memory renderer
//! sink and prints what was committed. With `--watch` the network is
//! re-synced every time its file changes, which exercises the modify and
//! delete paths a live renderer sees.
//!
//! ## Architecture
//!
//! Settings come from a versioned RON file; shader implementations and
//! textures are resolved against the settings' package roots before
//! conversion. Logging goes through `tracing` to stderr so JSON output on
//! stdout stays clean.

mod cli;
mod file_watcher;
mod loader;
mod package;
mod session;
mod settings;

use cli::{parse_cli, CliArgs, CliError, USAGE};
use file_watcher::{FileEvent, FileWatcher};
use loader::load_registry;
use session::Session;
use settings::Settings;
use shadenet_rman::SyncReport;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Settings plus the directory relative package roots are taken from
fn load_settings(cli: &CliArgs) -> Result<(Settings, PathBuf), CliError> {
    match cli.settings_path() {
        Some(path) => {
            let settings = Settings::load(&path).map_err(|source| CliError::Settings {
                path: path.clone(),
                source,
            })?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((settings, base_dir))
        }
        None => {
            let base_dir = cli.network.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((Settings::default(), base_dir))
        }
    }
}

fn print_report(cli: &CliArgs, session: &Session, report: &SyncReport) -> Result<(), CliError> {
    if cli.dump {
        println!("{}", session.dump());
    }
    if cli.json {
        println!("{}", session.to_json(report)?);
    } else {
        print!("{}", session.summary(report));
    }
    Ok(())
}

fn watch(cli: &CliArgs, settings: &Settings, session: &mut Session) -> Result<(), CliError> {
    let mut watcher = FileWatcher::new(settings.watch_debounce())?;
    watcher.watch_file(&cli.network)?;
    tracing::info!(files = ?watcher.watched_files(), "Waiting for changes (Ctrl+C to stop)");

    loop {
        let mut latest = None;
        for event in watcher.wait_events(Duration::from_secs(1)) {
            match event {
                FileEvent::Error(message) => tracing::warn!("File watcher: {message}"),
                other => latest = Some(other),
            }
        }

        let report = match latest {
            Some(FileEvent::Changed(path)) => {
                tracing::info!("Network changed, re-syncing: {:?}", path);
                match session.sync_file(&path) {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!("{e}");
                        continue;
                    }
                }
            }
            Some(FileEvent::Removed(path)) => {
                tracing::warn!("Network file removed, deleting its renderer networks: {:?}", path);
                session.finalize()
            }
            Some(FileEvent::Error(_)) | None => continue,
        };
        print_report(cli, session, &report)?;
    }
}

fn run(cli: &CliArgs, settings: &Settings, base_dir: &Path) -> Result<(), CliError> {
    if let Some(path) = &cli.write_settings {
        settings.save(path).map_err(|source| CliError::Settings {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote settings to {:?}", path);
        return Ok(());
    }

    let package = settings.package(base_dir);
    let registry = load_registry(cli.registry.as_deref(), &package)?;
    let mut session = Session::new(cli.material_id(), registry, settings.converter_config(), package);

    let report = session.sync_file(&cli.network)?;
    print_report(cli, &session, &report)?;
    tracing::info!(
        networks = session.sink().network_count(),
        valid = session.material().is_valid(),
        "Sync complete"
    );

    if cli.watch {
        return watch(cli, settings, &mut session);
    }
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::SyncFailed(report.errors.len()))
    }
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_cli(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    if cli.help {
        println!("{USAGE}");
        return;
    }

    let loaded = load_settings(&cli);
    init_tracing(loaded.as_ref().map_or("info", |(settings, _)| settings.log_filter.as_str()));
    tracing::info!("Starting shadenet v{}", env!("CARGO_PKG_VERSION"));

    let result = loaded.and_then(|(settings, base_dir)| run(&cli, &settings, &base_dir));
    if let Err(e) = result {
        tracing::error!("shadenet failed: {e}");
        std::process::exit(1);
    }
}
