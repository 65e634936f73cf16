//! panel-nav: drives the panel visibility coordinator from the command line.
//!
//! Each invocation mounts a controller against file-backed session storage,
//! applies one event, prints the resulting state as JSON, and unmounts.
//!
//! ## Subcommands
//!
//! - `status`: Print the state derived from storage and `--width`
//! - `toggle` / `expand` / `collapse`: Explicit user actions (persisted)
//! - `resize <WIDTH>`: Viewport resize (never persisted)
//! - `sign-out` / `sign-in`: Authentication changes; sign-out runs cleanup
//! - `overlay <open|close|toggle>`: Mobile overlay flag, shown for this run only
//! - `seed-legacy <true|false>`: Write the legacy cookie to test migration

mod host;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use host::Host;
use panel_core::StateChangeSource;

#[derive(Parser)]
#[command(name = "panel-nav")]
#[command(about = "Panel visibility coordinator harness")]
#[command(version)]
struct Cli {
    /// Storage root (defaults to ~/.panel-nav)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Viewport width in pixels at mount time
    #[arg(long, global = true, default_value_t = 1200.0)]
    width: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current navigation state
    Status,
    /// Toggle the panel
    Toggle,
    /// Expand the panel
    Expand,
    /// Collapse the panel
    Collapse,
    /// Resize the viewport after mounting
    Resize {
        /// New viewport width in pixels
        #[arg(id = "new_width", value_name = "WIDTH")]
        to: f64,
    },
    /// Sign out: runs every registered cleanup callback
    SignOut,
    /// Sign in: leaves the panel untouched
    SignIn,
    /// Change the mobile overlay flag for this invocation only (never persisted)
    Overlay {
        #[arg(value_enum)]
        action: OverlayAction,
    },
    /// Store the legacy `collapsed` cookie
    SeedLegacy {
        #[arg(value_name = "COLLAPSED", action = clap::ArgAction::Set)]
        collapsed: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OverlayAction {
    Open,
    Close,
    Toggle,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "panel-nav failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let host = Host::open(cli.root, cli.width)?;

    if let Commands::SeedLegacy { collapsed } = cli.command {
        host.seed_legacy(collapsed);
        return host.close();
    }

    let mut panel = host.mount();
    match cli.command {
        Commands::Status | Commands::SeedLegacy { .. } => {}
        Commands::Toggle => {
            panel.toggle(StateChangeSource::UserAction);
        }
        Commands::Expand => {
            panel.expand(StateChangeSource::UserAction);
        }
        Commands::Collapse => {
            panel.collapse(StateChangeSource::UserAction);
        }
        Commands::Resize { to } => host.viewport().resize(to),
        Commands::SignOut => {
            let report = host.registry().execute_all();
            if !report.is_clean() {
                for failure in &report.failures {
                    tracing::warn!(error = %failure, "Sign-out cleanup failure");
                }
            }
        }
        Commands::SignIn => {
            panel.handle_authentication_change(true);
        }
        Commands::Overlay { action } => match action {
            OverlayAction::Open => panel.set_open_mobile(true),
            OverlayAction::Close => panel.set_open_mobile(false),
            OverlayAction::Toggle => {
                panel.toggle_open_mobile();
            }
        },
    }

    let report = host.report(&panel);
    panel.stop();
    drop(panel);

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Failed to serialize state: {}", e))?;
    println!("{}", json);

    host.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_width_does_not_replace_mount_width() {
        let cli = Cli::try_parse_from(["panel-nav", "--width", "1300", "resize", "400"]).unwrap();
        assert_eq!(cli.width, 1300.0);
        match cli.command {
            Commands::Resize { to } => assert_eq!(to, 400.0),
            _ => panic!("expected resize"),
        }
    }

    #[test]
    fn test_resize_keeps_default_mount_width() {
        let cli = Cli::try_parse_from(["panel-nav", "resize", "400"]).unwrap();
        assert_eq!(cli.width, 1200.0);
        assert!(matches!(cli.command, Commands::Resize { to } if to == 400.0));
    }
}
