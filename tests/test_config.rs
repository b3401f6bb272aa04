use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use hearth::config::Config;

// Global lock so env-var tests don't interfere with each other
static TEST_LOCK: Mutex<()> = Mutex::new(());
static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

fn scratch_root(tag: &str) -> PathBuf {
    let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
    let root = std::env::temp_dir().join(format!(
        "hearth-config-{}-{}-{}",
        tag,
        std::process::id(),
        seq
    ));
    fs::create_dir_all(&root).unwrap();
    root
}

fn clear_env() {
    for name in ["PORT", "DOCUMENT_ROOT", "INDEX_FILE", "WORKERS", "DEBUG"] {
        std::env::remove_var(name);
    }
}

#[test]
fn test_config_defaults() {
    let _lock = TEST_LOCK.lock().unwrap();
    clear_env();

    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 60001);
    assert_eq!(cfg.root, PathBuf::from("./www"));
    assert_eq!(cfg.index, "index.html");
    assert_eq!(cfg.workers, 4);
    assert!(!cfg.debug);
}

#[test]
fn test_config_from_environment() {
    let _lock = TEST_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PORT", "8080");
    std::env::set_var("DOCUMENT_ROOT", "/srv/site");
    std::env::set_var("INDEX_FILE", "home.html");
    std::env::set_var("WORKERS", "0");
    std::env::set_var("DEBUG", "true");

    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.root, PathBuf::from("/srv/site"));
    assert_eq!(cfg.index, "home.html");
    assert_eq!(cfg.workers, 0);
    assert!(cfg.debug);

    clear_env();
}

#[test]
fn test_config_rejects_bad_port() {
    let _lock = TEST_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PORT", "70000");
    assert!(Config::load().is_err());

    std::env::set_var("PORT", "not-a-port");
    assert!(Config::load().is_err());

    clear_env();
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.port, cfg2.port);
    assert_eq!(cfg1.index, cfg2.index);
}

#[test]
fn test_validate_accepts_existing_tree() {
    let root = scratch_root("valid");
    fs::write(root.join("index.html"), "<p>home</p>").unwrap();

    let cfg = Config {
        root: root.clone(),
        ..Config::default()
    };
    assert!(cfg.validate().is_ok());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_validate_rejects_port_zero() {
    let root = scratch_root("port-zero");
    fs::write(root.join("index.html"), "x").unwrap();

    let cfg = Config {
        port: 0,
        root: root.clone(),
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_validate_rejects_missing_root() {
    let cfg = Config {
        root: PathBuf::from("/definitely/not/a/real/root"),
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_validate_rejects_file_as_root() {
    let root = scratch_root("file-root");
    let file = root.join("actually-a-file");
    fs::write(&file, "x").unwrap();

    let cfg = Config {
        root: file,
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_validate_rejects_missing_index() {
    let root = scratch_root("no-index");

    let cfg = Config {
        root: root.clone(),
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_validate_rejects_index_without_extension() {
    let root = scratch_root("no-ext");
    fs::write(root.join("index"), "x").unwrap();

    let cfg = Config {
        root: root.clone(),
        index: "index".to_string(),
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_validate_rejects_directory_as_index() {
    let root = scratch_root("dir-index");
    fs::create_dir_all(root.join("index.html")).unwrap();

    let cfg = Config {
        root: root.clone(),
        ..Config::default()
    };
    assert!(cfg.validate().is_err());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_log_level_follows_debug_flag() {
    let cfg = Config::default();
    assert_eq!(cfg.log_level(), tracing::Level::INFO);

    let cfg = Config {
        debug: true,
        ..Config::default()
    };
    assert_eq!(cfg.log_level(), tracing::Level::DEBUG);
}
