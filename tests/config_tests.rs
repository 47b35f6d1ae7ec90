//! Loading settings files from disk.

use std::io::Write;
use std::time::Duration;

use plainspeak::config::Settings;
use plainspeak::ConfigError;

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn file_overrides_defaults() {
    let file = settings_file(
        r#"
base_url = "http://svc:7000"

[progress]
tick_ms = 50
settle_ms = 100
"#,
    );
    let s = Settings::from_file(file.path()).expect("load");
    assert_eq!(s.base_url, "http://svc:7000");
    assert!(s.show_intro);
    let c = s.progress.to_config();
    assert_eq!(c.tick, Duration::from_millis(50));
    assert_eq!(c.settle, Duration::from_millis(100));
    assert_eq!(c.cap, 90.0);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    let err = Settings::from_file(&path).expect_err("should fail");
    assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_file_is_parse_error() {
    let file = settings_file("base_url = \n");
    let err = Settings::from_file(file.path()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
}

#[test]
fn wrong_type_is_parse_error() {
    let file = settings_file("[progress]\ntick_ms = \"fast\"\n");
    assert!(matches!(
        Settings::from_file(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn load_rejects_invalid_values() {
    let file = settings_file("[progress]\ncap = 0.0\n");
    let err = Settings::load(Some(file.path())).expect_err("should fail");
    assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
}

#[test]
fn empty_file_is_all_defaults() {
    let file = settings_file("");
    assert_eq!(Settings::from_file(file.path()).expect("load"), Settings::default());
}
