mod common;
use crate::common::builders::{ConfigFileBuilder, SourceConfigBuilder};
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::time::Duration;

use changewatch::config::{load_and_validate, ConfigFile, ConfigOverrides};
use changewatch::errors::ChangewatchError;
use changewatch::types::SourceKind;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn plain_source_list_uses_defaults() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "sources.txt",
        "# things to watch\n/var/log/app.log\n\nhttps://example.com/\n",
    );

    let cfg = load_and_validate(&path, &ConfigOverrides::default())?;

    assert_eq!(cfg.sources.len(), 2);
    assert_eq!(cfg.sources[0].kind(), SourceKind::File);
    assert_eq!(cfg.sources[1].kind(), SourceKind::Document);
    assert_eq!(cfg.settings.interval, Duration::from_secs(60));
    assert_eq!(cfg.settings.fetch_timeout, Duration::from_secs(10));
    assert!(cfg.notify.console);
    Ok(())
}

#[test]
fn extract_scripts_flag_switches_inferred_url_kind() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write(&dir, "sources.txt", "notes.txt\nhttps://example.com/\n");

    let overrides = ConfigOverrides {
        interval_secs: Some(5),
        extract_scripts: true,
        ..ConfigOverrides::default()
    };
    let cfg = load_and_validate(&path, &overrides)?;

    assert_eq!(cfg.sources[0].kind(), SourceKind::File);
    assert_eq!(cfg.sources[1].kind(), SourceKind::Scripts);
    assert_eq!(cfg.settings.interval, Duration::from_secs(5));
    Ok(())
}

#[test]
fn toml_config_with_per_source_settings() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "watch.toml",
        r#"
[config]
interval = "30s"
fetch_timeout = "5s"
stagger = "2s"
queue_length = 8

[notify]
console = false
log_dir = "logs"

[[source]]
location = "/etc/hosts"

[[source]]
location = "https://example.com/"
kind = "scripts"
interval = "5m"
resolve = true
"#,
    );

    let cfg = load_and_validate(&path, &ConfigOverrides::default())?;

    assert_eq!(cfg.settings.interval, Duration::from_secs(30));
    assert_eq!(cfg.settings.stagger, Duration::from_secs(2));
    assert_eq!(cfg.settings.queue_length, 8);
    assert!(!cfg.notify.console);
    assert_eq!(cfg.notify.log_dir.as_deref(), Some("logs"));

    let site = &cfg.sources[1];
    assert_eq!(site.kind(), SourceKind::Scripts);
    assert_eq!(site.interval_override(), Some(Duration::from_secs(300)));
    assert_eq!(
        site.effective_interval(cfg.settings.interval),
        Duration::from_secs(300)
    );
    assert!(site.resolve_scripts());
    assert_eq!(
        cfg.sources[0].effective_interval(cfg.settings.interval),
        Duration::from_secs(30)
    );
    Ok(())
}

#[test]
fn invalid_configs_are_rejected_before_polling() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let cases = [
        ("empty.txt", "# nothing here\n\n", "at least one"),
        ("dupes.txt", "a.txt\na.txt\n", "more than once"),
        (
            "bad_interval.toml",
            "[config]\ninterval = \"soon\"\n[[source]]\nlocation = \"a.txt\"\n",
            "interval",
        ),
        (
            "zero_interval.toml",
            "[config]\ninterval = \"0s\"\n[[source]]\nlocation = \"a.txt\"\n",
            "greater than zero",
        ),
        (
            "file_url.toml",
            "[[source]]\nlocation = \"https://example.com/\"\nkind = \"file\"\n",
            "is a URL",
        ),
        (
            "scripts_file.toml",
            "[[source]]\nlocation = \"page.html\"\nkind = \"scripts\"\n",
            "not an http(s) URL",
        ),
    ];

    for (name, contents, needle) in cases {
        let path = write(&dir, name, contents);
        let err = load_and_validate(&path, &ConfigOverrides::default())
            .expect_err(&format!("{name} should be rejected"));
        match err {
            ChangewatchError::ConfigError(msg) => {
                assert!(msg.contains(needle), "{name}: unexpected message {msg:?}")
            }
            other => panic!("{name}: expected a config error, got {other:?}"),
        }
    }
}

#[test]
fn malformed_toml_and_missing_files_are_errors() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let path = write(&dir, "broken.toml", "[[source]\nlocation = 1\n");
    let err = load_and_validate(&path, &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ChangewatchError::TomlError(_)));

    let missing = dir.path().join("nope.txt");
    let err = load_and_validate(&missing, &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ChangewatchError::IoError(_)));
}

#[test]
fn builder_produces_validated_config() {
    init_tracing();
    let cfg: ConfigFile = ConfigFileBuilder::new()
        .with_file("a.txt")
        .with_source(
            SourceConfigBuilder::new("https://example.com/")
                .kind(SourceKind::Document)
                .interval("90s")
                .build(),
        )
        .with_interval("15s")
        .with_queue_length(2)
        .build();

    assert_eq!(cfg.settings.interval, Duration::from_secs(15));
    assert_eq!(cfg.settings.queue_length, 2);
    assert_eq!(
        cfg.sources[1].interval_override(),
        Some(Duration::from_secs(90))
    );
}
