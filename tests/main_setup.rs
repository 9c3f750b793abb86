use serial_test::serial;
use std::time::Duration;
use std::{env, panic};
use surprise_card::{AppConfig, config::Env, errors::InitError};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "CARD_STATE_PATH",
    "CARD_ASSET_DIR",
    "CARD_AUDIO_DIR",
    "CARD_TRACK_SWITCH_DELAY_MS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly the given config variables set (all others cleared),
/// then restores the previous environment.
fn run_with_env<T, R>(vars: &[(&'static str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_requires_state_path() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert!(
        matches!(result, Err(InitError::MissingVar("CARD_STATE_PATH"))),
        "Production config loading should refuse a missing state path"
    );
}

#[test]
#[serial]
fn test_app_config_production_with_state_path() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("CARD_STATE_PATH", "/var/lib/card/state.json"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.state_path.to_str(), Some("/var/lib/card/state.json"));
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.state_path.to_str(), Some(".surprise-card/state.json"));
    assert_eq!(config.asset_dir.to_str(), Some("images"));
    assert_eq!(config.audio_dir.to_str(), Some("audio"));
    assert_eq!(config.track_switch_delay, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_app_config_unknown_env_is_local() {
    let config = run_with_env(&[("APP_ENV", "staging")], AppConfig::load).unwrap();
    assert_eq!(config.env, Env::Local);
}

#[test]
#[serial]
fn test_app_config_custom_values() {
    let config = run_with_env(
        &[
            ("CARD_ASSET_DIR", "/srv/card/img"),
            ("CARD_AUDIO_DIR", "/srv/card/audio"),
            ("CARD_TRACK_SWITCH_DELAY_MS", "250"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.asset_dir.to_str(), Some("/srv/card/img"));
    assert_eq!(config.audio_dir.to_str(), Some("/srv/card/audio"));
    assert_eq!(config.track_switch_delay, Duration::from_millis(250));
}

#[test]
#[serial]
fn test_app_config_invalid_delay() {
    let result = run_with_env(
        &[("CARD_TRACK_SWITCH_DELAY_MS", "five seconds")],
        AppConfig::load,
    );

    match result {
        Err(InitError::InvalidVar { name, value }) => {
            assert_eq!(name, "CARD_TRACK_SWITCH_DELAY_MS");
            assert_eq!(value, "five seconds");
        }
        other => panic!("expected InvalidVar, got {other:?}"),
    }
}
