use std::collections::HashMap;
use std::path::PathBuf;

use timbre::catalog::{ColorTag, VoiceCatalog, VoiceModelId, NEUTRAL_STYLE};
use timbre::config::AppConfig;
use timbre::error::SessionError;
use timbre::media::upload::{guess_media_type, is_accepted};
use timbre::media::UploadedFile;
use timbre::memory::history::HISTORY_KEY;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_builtin_catalog_is_ordered() {
    let catalog = VoiceCatalog::builtin();
    let ids: Vec<u32> = catalog.all().iter().map(|m| m.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(catalog.get(VoiceModelId(2)).unwrap().name, "Female Voice 1");
    assert!(catalog.get(VoiceModelId(7)).is_none());
}

#[test]
fn test_search_matches_name_and_description() {
    let catalog = VoiceCatalog::builtin();
    let names = |query: &str| -> Vec<String> {
        catalog.search(query).into_iter().map(|m| m.name.clone()).collect()
    };

    assert_eq!(names("robot"), vec!["Robotic Voice"]);
    assert_eq!(names("BRITISH"), vec!["Female Voice 1"]);
    assert_eq!(names("female").len(), 2);
    assert_eq!(names("  ").len(), 6);
    assert!(names("opera").is_empty());
}

#[test]
fn test_every_tag_has_a_distinct_style() {
    let tags = [
        ColorTag::Blue,
        ColorTag::Purple,
        ColorTag::Indigo,
        ColorTag::Violet,
        ColorTag::Slate,
    ];
    let dots: Vec<&str> = tags.iter().map(|t| t.style().dot).collect();
    for (i, dot) in dots.iter().enumerate() {
        assert_ne!(*dot, NEUTRAL_STYLE.dot);
        assert!(!dots[i + 1..].contains(dot), "{} reused", dot);
    }
    assert_eq!(ColorTag::Purple.style().dot, "bg-purple-500");
    assert_eq!(ColorTag::Slate.style().idle, NEUTRAL_STYLE.idle);
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::from_lookup(lookup(&[]));
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.history_key, HISTORY_KEY);
    assert_eq!(config.cadence_ms, 50);
    assert_eq!(config.initial_volume, 0.75);
    assert_eq!(config.demo_model, 2);
    assert!(config.store_path.is_none());
}

#[test]
fn test_config_overrides() {
    let config = AppConfig::from_lookup(lookup(&[
        ("TIMBRE_STORE", "/tmp/timbre/history.json"),
        ("TIMBRE_CADENCE_MS", " 20 "),
        ("TIMBRE_VOLUME", "1.7"),
        ("TIMBRE_DEMO_FILE", "take.wav"),
        ("TIMBRE_DEMO_MODEL", "5"),
    ]));
    assert_eq!(config.store_path, Some(PathBuf::from("/tmp/timbre/history.json")));
    assert_eq!(config.cadence_ms, 20);
    assert_eq!(config.initial_volume, 1.0, "volume is clamped");
    assert_eq!(config.demo_file, Some(PathBuf::from("take.wav")));
    assert_eq!(config.demo_model, 5);
}

#[test]
fn test_malformed_values_are_ignored() {
    let config = AppConfig::from_lookup(lookup(&[
        ("TIMBRE_CADENCE_MS", "fast"),
        ("TIMBRE_VOLUME", "loud"),
        ("TIMBRE_DEMO_MODEL", "-3"),
    ]));
    assert_eq!(config.cadence_ms, 50);
    assert_eq!(config.initial_volume, 0.75);
    assert_eq!(config.demo_model, 2);
}

#[test]
fn test_upload_acceptance() {
    assert!(is_accepted("take.flac", "audio/flac"));
    assert!(is_accepted("TAKE.MP3", ""));
    assert!(is_accepted("voice.m4a", ""));
    assert!(!is_accepted("notes.txt", ""));
    assert!(!is_accepted("clip.wav", "video/mp4"));

    assert_eq!(guess_media_type("a.ogg"), Some("audio/ogg"));
    assert_eq!(guess_media_type("a.flac"), None);

    let err = UploadedFile::new("notes.txt", "text/plain", vec![1u8]).unwrap_err();
    assert_eq!(
        err,
        SessionError::UnsupportedMedia {
            name: "notes.txt".to_string(),
            media_type: "text/plain".to_string(),
        }
    );
}

#[test]
fn test_upload_naming_and_size() {
    let file = UploadedFile::new("my.take.mp3", "audio/mpeg", vec![0u8; 1_572_864]).unwrap();
    assert_eq!(file.base_name(), "my");
    assert_eq!(file.size(), 1_572_864);
    assert_eq!(file.display_size(), "1.50 MB");

    let tiny = UploadedFile::new("x.wav", "", vec![0u8; 10]).unwrap();
    assert_eq!(tiny.display_size(), "0.00 MB");
    assert_eq!(tiny.media_type(), "");
}

#[test]
fn test_upload_debug_omits_payload() {
    let file = UploadedFile::new("clip.wav", "audio/wav", vec![7u8; 4096]).unwrap();
    let printed = format!("{:?}", file);
    assert!(printed.contains("clip.wav"));
    assert!(printed.contains("<4096 bytes>"));
    assert!(!printed.contains("7, 7"));
}
