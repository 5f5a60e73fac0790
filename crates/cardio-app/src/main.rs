#![forbid(unsafe_code)]

//! `cardio` binary entry point.

use std::fs::{self, File};
use std::path::Path;
use std::sync::{Arc, Mutex};

use cardio_app::AppModel;
use cardio_app::cli::Opts;
use cardio_core::InputMap;
use cardio_live::HttpTransport;
use cardio_runtime::{Program, ProgramConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = Opts::parse();

    // The terminal owns stdout and stderr while the program runs, so logs
    // only go to a file.
    if let Some(path) = &opts.log_file
        && let Err(e) = init_logging(path)
    {
        eprintln!("Cannot open log file {}: {e}", path.display());
        std::process::exit(1);
    }

    let base = match opts.base_inputs.as_deref().map(load_base_inputs).transpose() {
        Ok(base) => base,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let transport = match HttpTransport::new(opts.endpoint.clone(), opts.timeout) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(endpoint = %opts.endpoint, "starting client");

    let mut model = AppModel::new(Arc::new(transport));
    if let Some(base) = base {
        model = model.with_base_inputs(base);
    }

    let config = ProgramConfig::default().with_mouse(opts.mouse);
    match Program::new(model, config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_base_inputs(path: &Path) -> Result<InputMap, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read base inputs {}: {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Base inputs {} are not a JSON object: {e}", path.display()))
}
