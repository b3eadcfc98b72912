//! Configuration loading tests that touch the process environment.

mod helpers;

use driver_upload::config::{Config, Overrides};
use helpers::TestEnv;
use serial_test::serial;
use std::env;
use std::fs;

const VARS: &[&str] = &["KERNEL_VER", "RC_NUMBER", "ARTIFACTORY_BASE", "UPLOAD_CLIENT"];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_reads_environment() {
    clear_vars();
    env::set_var("KERNEL_VER", "6.8.0-test");
    env::set_var("ARTIFACTORY_BASE", "scratch/drivers");

    let config = Config::load(None, &Overrides::default()).unwrap();
    clear_vars();

    assert_eq!(config.kernel_version, "6.8.0-test");
    assert_eq!(config.base_remote_dir, "scratch/drivers");
    assert_eq!(config.special_driver_catalog[0].resolved_filename, "jnl.ko.6.8.0-test.56");
}

#[test]
#[serial]
fn test_environment_beats_config_file() {
    clear_vars();
    let env_dir = TestEnv::new();
    let path = env_dir.work_dir.join("drivers.json");
    fs::write(&path, r#"{"kernelVersion": "from-file", "rcNumber": "9"}"#).unwrap();
    env::set_var("KERNEL_VER", "from-env");

    let config = Config::load(Some(&path), &Overrides::default()).unwrap();
    clear_vars();

    assert_eq!(config.kernel_version, "from-env");
    assert_eq!(config.rc_number, "9");
}

#[test]
#[serial]
fn test_bad_config_file_names_path() {
    clear_vars();
    let env_dir = TestEnv::new();
    let path = env_dir.work_dir.join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Config::load(Some(&path), &Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
#[serial]
fn test_missing_config_file() {
    clear_vars();
    let env_dir = TestEnv::new();
    let path = env_dir.work_dir.join("absent.json");
    assert!(Config::load(Some(&path), &Overrides::default()).is_err());
}

#[test]
#[serial]
fn test_work_dir_dotenv_feeds_load() {
    clear_vars();
    let env_dir = TestEnv::new();
    let dotenv = env_dir.work_dir.join(".env");
    fs::write(&dotenv, "KERNEL_VER=6.6.0-dotenv\nRC_NUMBER=12\n").unwrap();

    dotenvy::from_path(&dotenv).unwrap();
    let config = Config::load(None, &Overrides::default()).unwrap();
    clear_vars();

    assert_eq!(config.kernel_version, "6.6.0-dotenv");
    assert_eq!(config.special_driver_catalog[0].resolved_filename, "jnl.ko.6.6.0-dotenv.12");
}
