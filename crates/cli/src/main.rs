use std::{net::SocketAddr, sync::Arc};

use {
    anyhow::Context as _,
    clap::Parser,
    orion_config::OrionConfig,
    orion_discord::OrionHandler,
    orion_gemini::{GeminiConfig, GeminiProvider},
    orion_relay::{ConversationStore, DeliveryConfig, DeliveryController, Dispatcher},
    secrecy::ExposeSecret,
    serenity::Client,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "orion", about = "Orion: Gemini answers streamed into Discord", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, env = "ORION_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, env = "ORION_JSON_LOGS", default_value_t = false)]
    json_logs: bool,

    /// Port for the liveness endpoint (overrides `PORT`).
    #[arg(long)]
    port: Option<u16>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn gemini_config(config: &OrionConfig) -> GeminiConfig {
    let mut gemini = GeminiConfig::new(config.gemini_api_key.clone());
    if let Some(model) = &config.gemini_model {
        gemini.model.clone_from(model);
    }
    if let Some(base_url) = &config.gemini_base_url {
        gemini.base_url.clone_from(base_url);
    }
    if let Some(instruction) = &config.system_instruction {
        gemini.system_instruction.clone_from(instruction);
    }
    gemini
}

fn build_dispatcher(config: &OrionConfig) -> Dispatcher {
    let history = match config.history_turns {
        Some(max) => ConversationStore::with_max_turns(max),
        None => ConversationStore::new(),
    };
    let delivery = DeliveryController::new(DeliveryConfig {
        edit_every_chars: config.edit_every_chars,
        idle_timeout: config.stream_idle_timeout,
        ..DeliveryConfig::default()
    });
    let provider = GeminiProvider::new(gemini_config(config));
    info!(model = provider.model(), "gemini backend configured");

    Dispatcher::new(history, Arc::new(provider), delivery)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = orion_config::load().context("invalid configuration")?;
    info!(version = env!("CARGO_PKG_VERSION"), config = ?config, "starting orion");

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port.unwrap_or(config.port)));
    tokio::spawn(async move {
        if let Err(e) = orion_gateway::serve(addr).await {
            error!(error = %e, "liveness endpoint stopped");
        }
    });

    let dispatcher = Arc::new(build_dispatcher(&config));
    let mut client = Client::builder(config.discord_token.expose_secret(), OrionHandler::intents())
        .event_handler(OrionHandler::new(dispatcher))
        .await
        .context("failed to build discord client")?;

    client.start().await.context("discord client stopped")?;
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::time::Duration};

    fn config(pairs: &[(&str, &str)]) -> OrionConfig {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain([
                ("DISCORD_TOKEN".to_string(), "t".to_string()),
                ("GEMINI_API_KEY".to_string(), "k".to_string()),
            ])
            .collect();
        orion_config::from_lookup(|name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["orion"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
        assert_eq!(cli.port, None);
    }

    #[test]
    fn cli_port_override() {
        let cli = Cli::try_parse_from(["orion", "--port", "3000", "--json-logs"]).unwrap();
        assert_eq!(cli.port, Some(3000));
        assert!(cli.json_logs);
    }

    #[test]
    fn gemini_defaults_survive_unset_overrides() {
        let gemini = gemini_config(&config(&[]));
        assert_eq!(gemini.model, orion_gemini::DEFAULT_MODEL);
        assert_eq!(gemini.base_url, orion_gemini::DEFAULT_BASE_URL);
        assert_eq!(
            gemini.system_instruction,
            orion_gemini::DEFAULT_SYSTEM_INSTRUCTION
        );
    }

    #[test]
    fn gemini_overrides_are_applied() {
        let gemini = gemini_config(&config(&[
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_BASE_URL", "http://localhost:1"),
            ("ORION_SYSTEM_INSTRUCTION", "be terse"),
        ]));
        assert_eq!(gemini.model, "gemini-2.0-flash");
        assert_eq!(gemini.base_url, "http://localhost:1");
        assert_eq!(gemini.system_instruction, "be terse");
    }

    #[test]
    fn dispatcher_uses_configured_history_bound() {
        let dispatcher = build_dispatcher(&config(&[("ORION_HISTORY_TURNS", "4")]));
        assert_eq!(dispatcher.history().max_turns(), Some(4));

        let unbounded = build_dispatcher(&config(&[("ORION_HISTORY_TURNS", "0")]));
        assert_eq!(unbounded.history().max_turns(), None);
    }

    #[test]
    fn delivery_config_follows_env() {
        let cfg = config(&[
            ("ORION_EDIT_EVERY_CHARS", "50"),
            ("ORION_STREAM_IDLE_TIMEOUT_SECS", "5"),
        ]);
        let dispatcher = build_dispatcher(&cfg);
        let delivery = dispatcher.delivery().config();
        assert_eq!(delivery.edit_every_chars, 50);
        assert_eq!(delivery.idle_timeout, Some(Duration::from_secs(5)));
        assert_eq!(delivery.max_message_chars, 2000);
    }
}
