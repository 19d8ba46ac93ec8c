// Email Benchmarking onboarding wizard
// Library entry point

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod models;
pub mod smoke;
pub mod utils;
pub mod wizard;

use log::{error, info};
use std::path::PathBuf;

use crate::config::WizardConfig;

/// Initialize logging system with dual format (JSON + human-readable)
fn init_logging(with_stdout: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    let json_log_file = log_dir.join(format!("onboarding-{}.log", timestamp));
    let txt_log_file = log_dir.join(format!("onboarding-{}.txt", timestamp));

    // Stdout stays off for the console flows so prompts are not interleaved with log lines.
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let meta = utils::logging::parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}",
                        utils::logging::format_human_readable_log(
                            &timestamp_local.to_string(),
                            record.level(),
                            record.target(),
                            &meta,
                        )
                    ));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let meta = utils::logging::parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}\n",
                        utils::logging::format_json_log(
                            &timestamp_utc,
                            record.level(),
                            record.target(),
                            &meta,
                        )
                    ));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let meta = utils::logging::parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}\n",
                        utils::logging::format_human_readable_log(
                            &timestamp_local.to_string(),
                            record.level(),
                            record.target(),
                            &meta,
                        )
                    ));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(log_dir)
}

fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<WizardConfig> {
    let path = config_path.unwrap_or_else(utils::path_resolver::resolve_config_file);
    info!(
        "[PHASE: initialization] [STEP: config] Loading configuration from {:?}",
        path
    );
    WizardConfig::load(Some(&path))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))
}

/// Interactive benchmark wizard: terms, API key, list selection.
pub fn run_console(config_path: Option<PathBuf>) {
    if let Err(e) = init_logging(false) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(
        "[PHASE: initialization] Benchmark wizard starting at {}",
        chrono::Utc::now()
    );

    let result = load_config(config_path)
        .and_then(|config| runtime()?.block_on(console::run_benchmark(&config)));

    if let Err(e) = result {
        error!("[PHASE: console] [STEP: fatal] Wizard exited with error: {:?}", e);
        eprintln!("Onboarding error: {}", e);
        std::process::exit(1);
    }
}

/// Interactive signup: basic info, then organization info when the organization is new.
pub fn run_signup(config_path: Option<PathBuf>) {
    if let Err(e) = init_logging(false) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(
        "[PHASE: initialization] Signup wizard starting at {}",
        chrono::Utc::now()
    );

    let result = load_config(config_path)
        .and_then(|config| runtime()?.block_on(console::run_signup(&config)));

    if let Err(e) = result {
        error!("[PHASE: signup] [STEP: fatal] Signup exited with error: {:?}", e);
        eprintln!("Onboarding error: {}", e);
        std::process::exit(1);
    }
}

/// Deterministic flow proof runner (for automated verification / log capture).
/// Writes `flow_smoke_transcript.log` under `Onboarding_Log/` and exits 0/1.
pub fn run_flow_smoke(config_path: Option<PathBuf>) {
    let log_dir = match init_logging(true) {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };
    info!(
        "[PHASE: initialization] Flow smoke starting at {}",
        chrono::Utc::now()
    );

    let result = load_config(config_path).and_then(|config| {
        let transcript = runtime()?.block_on(smoke::flow_smoke(&config))?;
        let log_dir = match log_dir {
            Some(dir) => dir,
            None => utils::path_resolver::resolve_log_folder()?,
        };
        let path = log_dir.join(smoke::TRANSCRIPT_FILE);
        std::fs::write(&path, transcript.render())
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
        info!(
            "[PHASE: smoke] [STEP: transcript] Written to {:?}",
            path
        );
        if transcript.passed() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("flow smoke checks failed, see {:?}", path))
        }
    });

    if let Err(e) = result {
        error!("[PHASE: smoke] [STEP: flow] Smoke exited with error: {:?}", e);
        eprintln!("Onboarding error: {}", e);
        std::process::exit(1);
    }
}
