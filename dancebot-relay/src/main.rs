use dancebot_core::logging::{file_logging_enabled, init_tracing};
use dancebot_core::{CoreError, DancebotConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const APP_NAME: &str = "dancebot-relay";

fn main() {
    // Tracing first, so config errors are logged
    init_tracing(APP_NAME, file_logging_enabled());

    let config = match DancebotConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            warn!(
                "Created config template at {}; starting with defaults",
                path.display()
            );
            DancebotConfig::default()
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let result = runtime.block_on(async {
        let listener = dancebot_relay::bind(&config.relay).await?;
        dancebot_relay::serve(listener, &config.relay, cancel_token).await
    });

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
