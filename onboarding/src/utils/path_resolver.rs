use anyhow::Result;
use std::path::PathBuf;

const LOG_DIR_ENV: &str = "ONBOARDING_LOG_DIR";
const LOG_DIR_NAME: &str = "Onboarding_Log";

/// Resolve log folder (absolute path)
pub fn resolve_log_folder() -> Result<PathBuf> {
    // Explicit override wins (CI, containers).
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV).filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
        return Ok(dir);
    }

    // Walk up from CWD looking for an existing `Onboarding_Log/`.
    if let Ok(mut dir) = std::env::current_dir() {
        for _ in 0..12 {
            let candidate = dir.join(LOG_DIR_NAME);
            if candidate.is_dir() {
                return Ok(candidate);
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }

    // Fallback: per-user data dir, then CWD.
    let base = dirs::data_local_dir()
        .map(|d| d.join("benchmark-onboarding"))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let log_dir = base.join(LOG_DIR_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

/// Default configuration file: `onboarding.toml` in CWD, else in the user config dir.
pub fn resolve_config_file() -> PathBuf {
    let local = PathBuf::from("onboarding.toml");
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|d| d.join("benchmark-onboarding").join("onboarding.toml"))
        .unwrap_or(local)
}
