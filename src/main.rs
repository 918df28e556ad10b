use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use support_wizard::config::WizardConfig;
use support_wizard::form::spawn_persistence_task;
use support_wizard::i18n::{Catalog, MessageKey};
use support_wizard::session::{SessionDeps, WizardSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WizardConfig::from_env().context("Invalid configuration")?;

    // Logs go to a file so they never interleave with the prompt
    let _log_guard = init_tracing(&config.log_dir)?;

    eprintln!("📝 Support Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Logs: {}", config.log_dir.display());
    eprintln!(
        "   AI suggestions: {}",
        if config.openai_api_key.is_some() {
            config.model.as_str()
        } else {
            "disabled (OPENAI_API_KEY not set)"
        }
    );

    // ── Storage and collaborators ───────────────────────────────────────
    let deps = SessionDeps::open(&config)
        .await
        .with_context(|| format!("Failed to start with database {}", config.db_path.display()))?;
    let store = Arc::clone(&deps.store);
    let storage = Arc::clone(&deps.storage);
    let suggestions = Arc::clone(&deps.suggestions);

    if store.rehydrate(storage.as_ref()).await {
        eprintln!("   Restored saved application");
    }
    let persistence = spawn_persistence_task(Arc::clone(&store), Arc::clone(&storage));

    // ── Session with fatal boundary ──────────────────────────────────────
    let catalog = Catalog::new(config.locale);
    loop {
        let session = WizardSession::start(deps.clone()).await;
        let failure = match tokio::spawn(session.run()).await {
            Ok(Ok(())) => break,
            Ok(Err(e)) => format!("{e:#}"),
            Err(e) if e.is_panic() => panic_message(e.into_panic()),
            Err(e) => e.to_string(),
        };
        error!(error = %failure, "Session failed");

        if !fatal_screen(&catalog, &failure, config.debug).await {
            break;
        }
        // Reload from what was last persisted
        store.rehydrate(storage.as_ref()).await;
        suggestions.reset().await;
        info!("Session reloaded");
    }

    if let Err(e) = store.flush(storage.as_ref()).await {
        warn!("Failed to save form state on exit: {}", e);
    }
    persistence.abort();
    eprintln!("Goodbye.");
    Ok(())
}

fn init_tracing(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, "support-wizard.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(guard)
}

/// Full-screen failure notice. Returns whether to reload.
async fn fatal_screen(catalog: &Catalog, failure: &str, debug: bool) -> bool {
    eprintln!();
    eprintln!("❌ {}", catalog.t(MessageKey::FatalTitle));
    if debug {
        eprintln!("   {failure}");
    }
    eprintln!("   {}", catalog.t(MessageKey::FatalReload));
    eprint!("> ");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(answer)) => !matches!(answer.trim(), "quit" | "q" | "exit"),
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to read reload answer: {}", e);
            false
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
