//! Composer configuration.
//!
//! Provides a `ComposerConfig` struct shared by composer hosts to tune image
//! compression and to locate the chat server's message endpoint.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

/// Images at or under this size bypass compression (0.5 MiB).
pub const DEFAULT_COMPRESSION_BUDGET_BYTES: u64 = 512 * 1024;
/// Lossy re-encoding quality used for compressed images.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;
/// Edge length of staging list thumbnails in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 96;

/// Runtime configuration for a composer host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ComposerConfig {
    #[serde(default = "default_compression_budget_bytes")]
    pub compression_budget_bytes: u64,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub room_id: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            compression_budget_bytes: DEFAULT_COMPRESSION_BUDGET_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            server_url: None,
            room_id: None,
        }
    }
}

impl ComposerConfig {
    /// Parse and validate a config from a raw JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(payload)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|error| {
            Error::Config(format!("Failed to load config at {}: {error}", path.display()))
        })
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut normalized = self.clone();
        normalized.normalize();
        std::fs::write(path, serde_json::to_string_pretty(&normalized)?)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.compression_budget_bytes == 0 {
            return Err(Error::Config(
                "compression_budget_bytes must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg_quality must be between 1 and 100 (got {})",
                self.jpeg_quality
            )));
        }
        if self.thumbnail_size == 0 {
            return Err(Error::Config(
                "thumbnail_size must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.server_url {
            if !is_http_url(url) {
                return Err(Error::Config(
                    "server_url must include http:// or https://".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The room's message form action, `{server_url}/rooms/{room_id}/messages`.
    pub fn messages_url(&self) -> Option<String> {
        let server = normalize_text_option(self.server_url.clone())?;
        let room_id = self.room_id?;
        Some(format!(
            "{}/rooms/{room_id}/messages",
            server.trim_end_matches('/')
        ))
    }

    fn normalize(&mut self) {
        self.server_url = normalize_text_option(self.server_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
    }
}

const fn default_compression_budget_bytes() -> u64 {
    DEFAULT_COMPRESSION_BUDGET_BYTES
}

const fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

const fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_payload_uses_defaults() {
        let config = ComposerConfig::from_json("{}").unwrap();
        assert_eq!(config, ComposerConfig::default());
        assert_eq!(config.compression_budget_bytes, 524_288);
        assert_eq!(config.jpeg_quality, 85);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ComposerConfig::from_json(r#"{ "budget": 1 }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let err = ComposerConfig::from_json(r#"{ "jpeg_quality": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = ComposerConfig::from_json(r#"{ "jpeg_quality": 101 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_server_url_without_scheme() {
        let err = ComposerConfig::from_json(r#"{ "server_url": "chat.example.com" }"#).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn messages_url_requires_server_and_room() {
        let mut config = ComposerConfig::from_json(
            r#"{ "server_url": " https://chat.example.com/ ", "room_id": 7 }"#,
        )
        .unwrap();
        assert_eq!(
            config.messages_url().as_deref(),
            Some("https://chat.example.com/rooms/7/messages")
        );

        config.room_id = None;
        assert_eq!(config.messages_url(), None);
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ComposerConfig {
            server_url: Some("http://localhost:3000".to_string()),
            room_id: Some(1),
            ..ComposerConfig::default()
        };

        config.save_to_path(&path).unwrap();
        assert_eq!(ComposerConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ComposerConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, ComposerConfig::default());
    }
}
