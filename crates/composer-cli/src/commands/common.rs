use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use composer_core::util::normalize_text_option;
use composer_core::{CandidateFile, ComposerConfig, FileSource};

use crate::error::CliError;

pub const SERVER_URL_ENV: &str = "COMPOSER_SERVER_URL";
pub const ROOM_ID_ENV: &str = "COMPOSER_ROOM_ID";

const CONFIG_DIR_NAME: &str = "composer";
const CONFIG_FILE_NAME: &str = "config.json";

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path.unwrap_or_else(default_config_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Config file values with environment overrides applied.
pub fn load_config(path: &Path) -> Result<ComposerConfig, CliError> {
    let mut config = ComposerConfig::load_from_path(path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn apply_env_overrides(
    config: &mut ComposerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), CliError> {
    if let Some(server_url) = normalize_text_option(lookup(SERVER_URL_ENV)) {
        config.server_url = Some(server_url.trim_end_matches('/').to_string());
    }
    if let Some(raw) = normalize_text_option(lookup(ROOM_ID_ENV)) {
        config.room_id = Some(raw.parse().map_err(|_| {
            CliError::Config(format!("{ROOM_ID_ENV} must be a room number (got {raw})"))
        })?);
    }
    Ok(())
}

/// Read a local file as a picker candidate, typing it by extension.
pub fn read_candidate(path: &Path) -> Result<CandidateFile, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(CandidateFile::new(name, mime_type, bytes, FileSource::Picker))
}

pub fn read_candidates(paths: &[PathBuf]) -> Result<Vec<CandidateFile>, CliError> {
    paths.iter().map(|path| read_candidate(path)).collect()
}

#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
