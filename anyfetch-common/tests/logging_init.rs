//! The logging bootstrap installs a subscriber process-wide, so these
//! assertions live in their own test binary.

use anyfetch_common::observability::{init_logging, LogConfig, LogFormat};
use tempfile::TempDir;

#[test]
fn init_resolves_a_rolling_file_and_memoizes() {
    let dir = TempDir::new().unwrap();

    let first = init_logging(LogConfig {
        app_name: "anyfetch-tests",
        log_dir: Some(dir.path().to_path_buf()),
        emit_stderr: false,
        format: LogFormat::Text,
        default_filter: "debug",
    })
    .expect("install subscriber");

    assert_eq!(first.parent(), Some(dir.path()));
    let name = first.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("anyfetch-tests.log."), "{name}");

    // Events now have somewhere to go.
    tracing::info!(check = true, "logging bootstrap smoke event");

    // A second call with a different directory is a no-op reporting the
    // path the first call resolved.
    let other = TempDir::new().unwrap();
    let second = init_logging(LogConfig {
        log_dir: Some(other.path().to_path_buf()),
        ..LogConfig::default()
    })
    .expect("repeat call is a no-op");
    assert_eq!(second, first);
}
