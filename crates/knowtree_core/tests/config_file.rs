use knowtree_core::{ConfigError, CoreConfig};
use std::io::Write;

#[test]
fn load_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[layout]\nradius_step = 90.0\norigin = {{ x = 10.0, y = -5.0 }}\n\n[search]\nthreshold = 0.2\ndistance = 50"
    )
    .unwrap();

    let config = CoreConfig::load(file.path()).unwrap();
    assert_eq!(config.layout.radius_step, 90.0);
    assert_eq!(config.layout.origin.x, 10.0);
    assert_eq!(config.layout.origin.y, -5.0);
    assert_eq!(config.search.threshold, 0.2);
    assert_eq!(config.search.distance, 50);
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn load_rejects_non_positive_radius() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[layout]\nradius_step = 0.0").unwrap();
    let err = CoreConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref message) if message.contains("radius_step")));
}
