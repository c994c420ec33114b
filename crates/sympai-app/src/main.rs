mod cli;
mod console;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use sympai_chat::{
    ApproxTokenCounter, ChatConfig, ChatFlags, ConversationSession, ConversationStore,
    HttpTransport, InMemoryStore, Message, Snapshot, SubmitSettings, Submitter, TokenCounter,
    TransportConfig, UsageAccountant,
};
use sympai_common::{Event, EventBus, SympaiError};
use sympai_config::schema::ChatDefaults;
use sympai_config::SympaiConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Workspace root, two levels up from crates/sympai-app/
        manifest_dir.join("..").join("..").join(".env"),
        std::path::PathBuf::from(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

/// Turn `--log-level` or the configured level into a filter directive.
/// A bare level applies to the sympai crates only.
fn log_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("sympai={level}")
    }
}

fn chat_config_from(defaults: &ChatDefaults) -> ChatConfig {
    ChatConfig {
        model: defaults.model.clone(),
        max_tokens: defaults.max_tokens,
        temperature: defaults.temperature,
        top_p: defaults.top_p,
        presence_penalty: defaults.presence_penalty,
        frequency_penalty: defaults.frequency_penalty,
    }
}

fn transport_config_from(config: &SympaiConfig) -> TransportConfig {
    let transport = TransportConfig::new(config.api.endpoint.clone())
        .with_client_id(config.api.client_id.clone())
        .with_connect_timeout(Duration::from_secs(u64::from(
            config.api.connect_timeout_secs,
        )));
    match config.api.api_key() {
        Some(key) => transport.with_api_key(key),
        None => transport,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let args = cli::parse();

    let loaded = match args.config {
        Some(ref path) => sympai_config::load_config_from(Path::new(path)),
        None => sympai_config::load_config(),
    };

    let level = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_directive().to_string(),
        (None, Err(_)) => "info".to_string(),
    };
    let fallback = log_directive("info");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            log_directive(&level).parse().unwrap_or_else(|_| {
                fallback
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into())
            }),
        ))
        .init();

    info!("SympAI v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => {
            error!("Config load failed: {e}");
            return ExitCode::from(2);
        }
        Err(e) => {
            warn!("Config load failed, using defaults: {e}");
            SympaiConfig::default()
        }
    };

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported by the console
        Err(SympaiError::Chat(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Submit the message as a new conversation and echo the reply.
async fn run(args: &cli::Args, config: &SympaiConfig) -> sympai_common::Result<()> {
    let transport = HttpTransport::new(transport_config_from(config)).map_err(|e| {
        error!("Failed to create transport: {e}");
        e
    })?;
    let transport = Arc::new(transport);

    let session = ConversationSession::new("New Chat", chat_config_from(&config.chat))
        .with_messages(vec![Message::user(args.message_text())]);
    let id = session.id.clone();
    let history_len = session.messages.len();

    let bus = Arc::new(EventBus::default());
    let store: Arc<dyn ConversationStore> = Arc::new(
        InMemoryStore::with_snapshot(Snapshot::new(vec![session])).with_events(Arc::clone(&bus)),
    );
    let flags = Arc::new(ChatFlags::new(
        config.preferences.auto_title && !args.no_title,
        config.preferences.count_total_tokens,
    ));
    let counter: Arc<dyn TokenCounter> = Arc::new(ApproxTokenCounter);
    let usage = Arc::new(UsageAccountant::new(Arc::clone(&counter)));

    let submitter = Submitter::new(
        transport,
        Arc::clone(&store),
        Arc::clone(&flags),
        usage.clone(),
        counter,
    )
    .with_settings(SubmitSettings {
        locale: args
            .language
            .clone()
            .unwrap_or_else(|| config.preferences.language.clone()),
        title_model: config.chat.model.clone(),
    });

    let console = tokio::spawn(console::run(
        bus.subscribe(),
        Arc::clone(&store),
        id.clone(),
        history_len,
    ));

    let stop_flags = Arc::clone(&flags);
    let stop_bus = Arc::clone(&bus);
    let stopper = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stop requested");
            stop_flags.stop_generating();
            stop_bus.publish(Event::GeneratingChanged(false));
        }
    });

    let outcome = submitter.submit(&id).await;
    match outcome {
        Ok(ref report) => {
            info!(
                state = %report.state,
                deltas = report.deltas_applied,
                "Submission finished"
            );
            if let Some(ref title) = report.title {
                bus.publish(Event::TitleSet {
                    session: id.clone(),
                    title: title.clone(),
                });
            }
        }
        Err(ref e) => {
            bus.publish(Event::SubmissionFailed(e.to_string()));
        }
    }

    bus.publish(Event::Shutdown);
    if let Err(e) = console.await {
        warn!("Console task failed: {e}");
    }
    stopper.abort();

    let total = usage.total();
    if total.total() > 0 {
        eprintln!(
            "tokens: {} prompt + {} completion",
            total.prompt_tokens, total.completion_tokens
        );
    }

    info!("Shutdown complete");
    outcome?;
    Ok(())
}
