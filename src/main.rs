use std::sync::Arc;
use surprise_card::{
    AppConfig, CardApp, CardServices, FileStore,
    assets::FileAssetLoader,
    audio::LogAudio,
    config::Env,
    display::{DisplayRegion, HashLocation, TerminalDisplay},
    models::CardAction,
    routes,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: #<page> | next | code <digits> | music | reset | status | help | quit";

/// main
///
/// Terminal host for the card: stdin stands in for the address bar and the
/// buttons, stdout is the display region, stderr carries the logs. Runs on a
/// single thread, like the page it replaces.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate only.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "surprise_card=debug".into());

    // 3. Initialize Logging based on Environment
    let production = matches!(&config, Ok(c) if c.env == Env::Production);
    if production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    let display = Arc::new(TerminalDisplay);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration invalid");
            show_init_failure(display.as_ref());
            return;
        }
    };

    // 4. Collaborators
    let (hash_tx, hash_rx) = mpsc::unbounded_channel();
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let location = Arc::new(HashLocation::with_notifier(hash_tx));

    let services = CardServices {
        store: Arc::new(FileStore::new(config.state_path.clone())),
        assets: Arc::new(FileAssetLoader::new(config.asset_dir.clone())),
        audio: Arc::new(LogAudio),
        display: display.clone(),
        location: location.clone(),
    };

    // 5. Card startup
    let app = match CardApp::initialize(config, services).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Application initialization failed");
            show_init_failure(display.as_ref());
            return;
        }
    };

    // Initial load notification.
    let outcome = app.start().await;
    tracing::debug!(?outcome, "Initial page handled");
    println!("{HELP}");

    // 6. Input reader: the address bar and the buttons.
    let input_app = app.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            let action = match line {
                "" => continue,
                "quit" | "exit" => break,
                "help" => {
                    println!("{HELP}");
                    continue;
                }
                "status" => {
                    match serde_json::to_string_pretty(&input_app.status()) {
                        Ok(json) => println!("{json}"),
                        Err(e) => tracing::warn!(error = %e, "Status could not be printed"),
                    }
                    continue;
                }
                "next" => CardAction::Continue,
                "music" => CardAction::ToggleMusic,
                "reset" => CardAction::Reset,
                _ if line.starts_with('#') => {
                    location.enter(line);
                    continue;
                }
                _ => match line.strip_prefix("code") {
                    Some(code) => CardAction::SubmitCode(code.trim().to_string()),
                    None => {
                        println!("{HELP}");
                        continue;
                    }
                },
            };
            if action_tx.send(action).is_err() {
                break;
            }
        }
        // Dropping the sender stops the event loop.
    });

    // 7. The long-running event loop.
    app.run(hash_rx, action_rx).await;
}

/// Full-page fallback for failures before the router exists.
fn show_init_failure(display: &dyn DisplayRegion) {
    if let Err(e) = display.commit(&routes::init_failure_page()) {
        tracing::error!(error = %e, "Init failure page could not be shown");
    }
}
