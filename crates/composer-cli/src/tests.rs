use std::path::{Path, PathBuf};

use composer_core::pending::{PendingContent, UploadProgress};
use composer_core::staging::{FileListEntry, FilePreview};
use composer_core::submission::{FileOutcome, SubmissionReport, TextOutcome};
use composer_core::{ClientMessageId, ComposerConfig, FileSource};
use pretty_assertions::assert_eq;

use crate::cli::ConfigCommands;
use crate::commands::common::{
    apply_env_overrides, default_config_path, format_bytes, read_candidate, resolve_config_path,
    ROOM_ID_ENV, SERVER_URL_ENV,
};
use crate::commands::compress::default_output_path;
use crate::commands::config::{run_config, InitValues};
use crate::commands::send::{apply_destination_overrides, ensure_delivered};
use crate::commands::stage::format_file_list;
use crate::error::CliError;
use crate::terminal::{describe_pending, short_id};

#[test]
fn resolve_config_path_prefers_explicit_path() {
    let explicit = PathBuf::from("/tmp/custom-composer.json");
    assert_eq!(resolve_config_path(Some(explicit.clone())), explicit);
}

#[test]
fn default_config_path_lives_in_composer_dir() {
    let path = default_config_path();
    assert!(path.ends_with(Path::new("composer").join("config.json")));
}

#[test]
fn env_overrides_replace_file_values() {
    let mut config = ComposerConfig {
        server_url: Some("https://old.example.com".to_string()),
        room_id: Some(1),
        ..ComposerConfig::default()
    };

    apply_env_overrides(&mut config, |key| match key {
        SERVER_URL_ENV => Some("https://chat.example.com/".to_string()),
        ROOM_ID_ENV => Some(" 42 ".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.server_url.as_deref(), Some("https://chat.example.com"));
    assert_eq!(config.room_id, Some(42));
}

#[test]
fn env_overrides_ignore_blank_values() {
    let mut config = ComposerConfig {
        room_id: Some(7),
        ..ComposerConfig::default()
    };
    apply_env_overrides(&mut config, |_| Some("   ".to_string())).unwrap();
    assert_eq!(config.room_id, Some(7));
    assert_eq!(config.server_url, None);
}

#[test]
fn env_overrides_reject_non_numeric_room() {
    let mut config = ComposerConfig::default();
    let result = apply_env_overrides(&mut config, |key| {
        (key == ROOM_ID_ENV).then(|| "general".to_string())
    });
    assert!(matches!(result, Err(CliError::Config(message)) if message.contains("general")));
}

#[test]
fn read_candidate_types_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("photo.PNG");
    let text_path = dir.path().join("notes.txt");
    std::fs::write(&image_path, [1, 2, 3]).unwrap();
    std::fs::write(&text_path, "hello").unwrap();

    let image = read_candidate(&image_path).unwrap();
    assert_eq!(image.name, "photo.PNG");
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes, vec![1, 2, 3]);
    assert_eq!(image.source, FileSource::Picker);

    let text = read_candidate(&text_path).unwrap();
    assert_eq!(text.mime_type, "text/plain");
}

#[test]
fn read_candidate_reports_missing_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.jpg");
    let err = read_candidate(&missing).unwrap_err();
    assert!(matches!(&err, CliError::ReadFile { path, .. } if path == &missing));
    assert!(err.to_string().contains("missing.jpg"));
}

#[test]
fn format_bytes_uses_binary_units() {
    assert_eq!(format_bytes(512), "512 B");
    assert_eq!(format_bytes(1536), "1.5 KiB");
    assert_eq!(format_bytes(524_288), "512.0 KiB");
    assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
}

#[test]
fn default_output_path_switches_to_jpg_after_reencode() {
    assert_eq!(
        default_output_path(Path::new("shots/photo.png"), "image/jpeg"),
        PathBuf::from("shots/photo.compressed.jpg")
    );
    assert_eq!(
        default_output_path(Path::new("photo.png"), "image/png"),
        PathBuf::from("photo.compressed.png")
    );
}

#[test]
fn destination_flags_override_config() {
    let mut config = ComposerConfig {
        server_url: Some("https://env.example.com".to_string()),
        room_id: Some(3),
        ..ComposerConfig::default()
    };

    apply_destination_overrides(&mut config, Some("https://flag.example.com/".to_string()), None);
    assert_eq!(config.server_url.as_deref(), Some("https://flag.example.com"));
    assert_eq!(config.room_id, Some(3));

    apply_destination_overrides(&mut config, None, Some(9));
    assert_eq!(
        config.messages_url().as_deref(),
        Some("https://flag.example.com/rooms/9/messages")
    );
}

#[test]
fn init_values_keep_unset_fields() {
    let existing = ComposerConfig {
        server_url: Some("https://chat.example.com".to_string()),
        jpeg_quality: 70,
        ..ComposerConfig::default()
    };
    let updated = InitValues {
        room_id: Some(5),
        ..InitValues::default()
    }
    .apply(existing)
    .unwrap();

    assert_eq!(updated.server_url.as_deref(), Some("https://chat.example.com"));
    assert_eq!(updated.jpeg_quality, 70);
    assert_eq!(updated.room_id, Some(5));
}

#[test]
fn init_values_are_validated() {
    let result = InitValues {
        quality: Some(0),
        ..InitValues::default()
    }
    .apply(ComposerConfig::default());
    assert!(matches!(result, Err(CliError::Core(_))));
}

#[test]
fn config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("composer").join("config.json");

    run_config(
        ConfigCommands::Init {
            server_url: Some("https://chat.example.com".to_string()),
            room_id: Some(12),
            budget: None,
            quality: Some(80),
            thumbnail_size: None,
        },
        &path,
    )
    .unwrap();

    let saved = ComposerConfig::load_from_path(&path).unwrap();
    assert_eq!(saved.room_id, Some(12));
    assert_eq!(saved.jpeg_quality, 80);
    assert_eq!(
        saved.messages_url().as_deref(),
        Some("https://chat.example.com/rooms/12/messages")
    );
}

#[test]
fn ensure_delivered_counts_failed_items() {
    let ok = SubmissionReport {
        text: Some(TextOutcome::Sent(ClientMessageId::new())),
        files: vec![FileOutcome::Uploaded {
            name: "a.png".to_string(),
            id: ClientMessageId::new(),
        }],
    };
    assert!(ensure_delivered(&ok).is_ok());

    let failed = SubmissionReport {
        text: Some(TextOutcome::Failed {
            id: ClientMessageId::new(),
            error: composer_core::Error::Submission("rejected".to_string()),
        }),
        files: vec![
            FileOutcome::Uploaded {
                name: "a.png".to_string(),
                id: ClientMessageId::new(),
            },
            FileOutcome::CompressionFailed {
                name: "b.png".to_string(),
                error: composer_core::Error::ImageDecode("b.png".to_string()),
            },
        ],
    };
    assert!(matches!(
        ensure_delivered(&failed),
        Err(CliError::SubmissionFailed { failed: 2, total: 3 })
    ));
}

#[test]
fn describe_pending_shows_progress_and_text() {
    let id = ClientMessageId::new();
    let short = short_id(id);
    assert_eq!(short.len(), 8);
    assert!(id.to_string().ends_with(&short));

    assert_eq!(
        describe_pending(id, &PendingContent::Upload(UploadProgress::new("cat.jpg", 7))),
        format!("[{short}] uploading cat.jpg   7%")
    );
    assert_eq!(
        describe_pending(id, &PendingContent::Text("  hi there \n".to_string())),
        format!("[{short}] pending: hi there")
    );
}

#[test]
fn file_list_lines_show_index_preview_and_caption() {
    let entries = vec![
        FileListEntry {
            index: 0,
            basename: "archive".to_string(),
            extension: String::new(),
            preview: FilePreview::Generic,
        },
        FileListEntry {
            index: 1,
            basename: "cat".to_string(),
            extension: "png".to_string(),
            preview: FilePreview::Thumbnail {
                data_uri: "data:image/jpeg;base64,AA==".to_string(),
            },
        },
    ];

    assert_eq!(
        format_file_list(&entries),
        vec![
            "  0  file       archive".to_string(),
            "  1  thumbnail  cat.png".to_string(),
        ]
    );
}
