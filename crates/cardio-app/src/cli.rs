#![forbid(unsafe_code)]

//! Command-line argument parsing for the terminal client.
//!
//! Parses args by hand. Every option has a `CARDIO_*` environment variable;
//! explicit flags win over the environment.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default prediction endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/predict";

const HELP_TEXT: &str = "\
cardio: cardiovascular risk assessment client

USAGE:
    cardio [OPTIONS]

OPTIONS:
    --endpoint=URL        Prediction endpoint (default: http://127.0.0.1:5000/predict)
    --base-inputs=PATH    JSON object of baseline inputs; predicts immediately
                          and opens on the results view
    --timeout-ms=N        Request timeout in milliseconds (default: none)
    --log-file=PATH       Write logs to PATH (default: logging off)
    --no-mouse            Disable mouse capture (wheel on sliders)
    --help, -h            Show this help message
    --version, -V         Show version

KEYBINDINGS (form):
    Tab / Shift-Tab       Next / previous field
    Left / Right          Cycle a choice field
    PgDn / PgUp           Next panel (validated) / previous panel
    F1-F5                 Jump to a panel
    Enter                 Next panel, or submit on the last one
    Ctrl+S                Submit

KEYBINDINGS (results):
    Up / Down             Select slider
    Left / Right          Adjust slider (Shift: x10)
    Mouse wheel           Adjust the slider under the pointer
    Enter / Ctrl+U        Update Prediction
    Esc                   Back to the form

    Ctrl+C / Ctrl+Q       Quit

ENVIRONMENT VARIABLES:
    CARDIO_ENDPOINT       Override --endpoint
    CARDIO_BASE_INPUTS    Override --base-inputs
    CARDIO_TIMEOUT_MS     Override --timeout-ms
    CARDIO_LOG_FILE       Override --log-file
    CARDIO_MOUSE          0 disables mouse capture
    RUST_LOG              Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub endpoint: String,
    pub base_inputs: Option<PathBuf>,
    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
    pub mouse: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            base_inputs: None,
            timeout: None,
            log_file: None,
            mouse: true,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment, printing help or
    /// errors and exiting where appropriate.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("cardio {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `var`.
    pub fn parse_from<I, F>(args: I, var: F) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = var("CARDIO_ENDPOINT") {
            opts.endpoint = val;
        }
        if let Some(val) = var("CARDIO_BASE_INPUTS") {
            opts.base_inputs = Some(PathBuf::from(val));
        }
        if let Some(val) = var("CARDIO_TIMEOUT_MS")
            && let Ok(ms) = val.parse()
        {
            opts.timeout = timeout_from_ms(ms);
        }
        if let Some(val) = var("CARDIO_LOG_FILE") {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = var("CARDIO_MOUSE") {
            opts.mouse = !matches!(val.trim(), "0" | "false" | "no" | "off");
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-mouse" => opts.mouse = false,
                other => {
                    if let Some(val) = other.strip_prefix("--endpoint=") {
                        opts.endpoint = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--base-inputs=") {
                        opts.base_inputs = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--timeout-ms=") {
                        let ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --timeout-ms value: {val}"))?;
                        opts.timeout = timeout_from_ms(ms);
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        if opts.endpoint.trim().is_empty() {
            return Err("Endpoint must not be empty".into());
        }
        Ok(Parsed::Run(opts))
    }
}

/// Zero means no timeout.
fn timeout_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
