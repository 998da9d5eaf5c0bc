use std::path::Path;

use composer_core::util::normalize_text_option;
use composer_core::ComposerConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::load_config;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Init {
            server_url,
            room_id,
            budget,
            quality,
            thumbnail_size,
        } => {
            let existing = ComposerConfig::load_from_path(config_path)?;
            let values = InitValues {
                server_url,
                room_id,
                budget,
                quality,
                thumbnail_size,
            };
            let config = values.apply(existing)?;
            config.save_to_path(config_path)?;
            println!("Wrote composer config to {}", config_path.display());
        }
    }
    Ok(())
}

/// Values passed to `config init`; unset ones keep the existing file's.
#[derive(Debug, Default)]
pub struct InitValues {
    pub server_url: Option<String>,
    pub room_id: Option<u64>,
    pub budget: Option<u64>,
    pub quality: Option<u8>,
    pub thumbnail_size: Option<u32>,
}

impl InitValues {
    pub fn apply(self, mut config: ComposerConfig) -> Result<ComposerConfig, CliError> {
        if let Some(server_url) = normalize_text_option(self.server_url) {
            config.server_url = Some(server_url.trim_end_matches('/').to_string());
        }
        if let Some(room_id) = self.room_id {
            config.room_id = Some(room_id);
        }
        if let Some(budget) = self.budget {
            config.compression_budget_bytes = budget;
        }
        if let Some(quality) = self.quality {
            config.jpeg_quality = quality;
        }
        if let Some(thumbnail_size) = self.thumbnail_size {
            config.thumbnail_size = thumbnail_size;
        }
        config.validate()?;
        Ok(config)
    }
}
