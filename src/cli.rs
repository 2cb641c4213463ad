use clap::Parser;
use std::path::PathBuf;

use crate::settings::SettingsInput;

/// Reading time estimates for articles
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Launch HTTP server serving the content folder (default mode for folders)
    #[arg(short, long, conflicts_with = "stdout")]
    pub server: bool,

    /// Print the reading time display for a single file (default mode for files)
    #[arg(short = 'o', long, conflicts_with = "server")]
    pub stdout: bool,

    /// Content file or folder (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Average reading speed. Non-positive values fall back to 200.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub words_per_minute: Option<i64>,

    /// Where placed estimates go: top or bottom
    #[arg(long, value_name = "POSITION")]
    pub position: Option<String>,

    /// Display template; must contain {minutes} exactly once
    #[arg(long, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Increase logging verbosity (-v = info, -vv = debug, -vvv = trace).
    /// Default is warn level. Can also set RUST_LOG env var.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Port to listen on when running in server mode (-s).
    /// Overrides the default port from config (default: 5300).
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host/IP address to bind to when running in server mode (-s).
    /// Overrides the default from config (default: 127.0.0.1).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}

impl Args {
    /// Get the log level filter string based on verbosity flags.
    /// Returns a filter suitable for tracing_subscriber::EnvFilter.
    pub fn log_level_filter(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        // Set level for this crate and tower_http (for request logging)
        format!(
            "{}={},tower_http={}",
            env!("CARGO_CRATE_NAME"),
            level,
            level
        )
    }

    /// Settings given on the command line. Unset flags are `None`.
    pub fn settings_overrides(&self) -> SettingsInput {
        SettingsInput {
            words_per_minute: self.words_per_minute,
            display_position: self.position.clone(),
            display_template: self.template.clone(),
            ..Default::default()
        }
    }
}
