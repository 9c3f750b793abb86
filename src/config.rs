use crate::errors::InitError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// AppConfig
///
/// Holds the card's entire configuration. Loaded once at startup and handed to
/// `CardApp::initialize`; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which variables are mandatory.
    pub env: Env,
    // JSON file standing in for browser local storage (holds the accepted-code flag).
    pub state_path: PathBuf,
    // Directory holding the card images (cake, gift box, envelope).
    pub asset_dir: PathBuf,
    // Directory holding the background tracks.
    pub audio_dir: PathBuf,
    // Delay between opening the envelope and switching to the letter track.
    pub track_switch_delay: Duration,
}

/// Env
///
/// Defines the runtime context: `Local` is lenient and human-readable,
/// `Production` demands an explicit state path and logs JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_STATE_PATH: &str = ".surprise-card/state.json";
const DEFAULT_ASSET_DIR: &str = "images";
const DEFAULT_AUDIO_DIR: &str = "audio";
const DEFAULT_TRACK_SWITCH_DELAY_MS: u64 = 5_000;

impl Default for AppConfig {
    /// default
    ///
    /// Local settings with the built-in defaults, used by tests to build an app
    /// without touching the process environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            track_switch_delay: Duration::from_millis(DEFAULT_TRACK_SWITCH_DELAY_MS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Errors
    /// Returns `InitError::MissingVar` when `CARD_STATE_PATH` is absent in
    /// production, and `InitError::InvalidVar` when the track delay is not a
    /// whole number of milliseconds. Both end up on the init failure page.
    pub fn load() -> Result<Self, InitError> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The state file decides whether the card re-prompts after a restart, so
        // production must name it explicitly.
        let state_path = match env {
            Env::Production => env::var("CARD_STATE_PATH")
                .map_err(|_| InitError::MissingVar("CARD_STATE_PATH"))?,
            Env::Local => {
                env::var("CARD_STATE_PATH").unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string())
            }
        };

        let track_switch_delay = match env::var("CARD_TRACK_SWITCH_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| InitError::InvalidVar {
                    name: "CARD_TRACK_SWITCH_DELAY_MS",
                    value: raw.clone(),
                })?,
            Err(_) => Duration::from_millis(DEFAULT_TRACK_SWITCH_DELAY_MS),
        };

        Ok(Self {
            env,
            state_path: PathBuf::from(state_path),
            asset_dir: PathBuf::from(
                env::var("CARD_ASSET_DIR").unwrap_or_else(|_| DEFAULT_ASSET_DIR.to_string()),
            ),
            audio_dir: PathBuf::from(
                env::var("CARD_AUDIO_DIR").unwrap_or_else(|_| DEFAULT_AUDIO_DIR.to_string()),
            ),
            track_switch_delay,
        })
    }
}
