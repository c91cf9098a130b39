// ============================================================================
// KuCoin Earn Bot
// ============================================================================
// Bot Telegram qui affiche les taux Earn de KuCoin (USDT, USDC, SOL, BNB)
//
// Démarrage :
// 1. .env optionnel, puis logging (fichier + console)
// 2. configuration (le token est obligatoire)
// 3. enregistrement des commandes auprès de Telegram
// 4. dispatcher jusqu'à SIGINT / SIGTERM
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use kucoin_earn_bot::app::App;
use kucoin_earn_bot::bot::{schema, Command};
use kucoin_earn_bot::config::{self, Config};

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le système de logging : fichier rotatif + console
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs (un layer par sortie)
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/kucoin-earn-bot/logs/kucoin-earn-bot.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=kucoin_earn_bot=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    // Nouveau fichier chaque jour : kucoin-earn-bot.log.2024-01-15
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "kucoin-earn-bot.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            // Par défaut : debug pour le bot, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kucoin_earn_bot=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(log_dir = %log_dir.display(), "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // .env optionnel : absent en production, pratique en local
    let _ = dotenvy::dotenv();

    let log_dir = config::log_dir_from_env();
    init_logging(&log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without file logging...");
    });

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.context("Impossible de démarrer le bot"));
        }
    };
    info!(?config, "Configuration loaded");

    let app = Arc::new(App::new(&config)?);
    let bot = Bot::new(&config.bot_token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("KuCoin earn bot starting up");
    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build();

    // SIGINT est géré par teloxide, on ajoute SIGTERM (docker stop, systemd)
    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        wait_for_sigterm().await;
        info!("SIGTERM received, stopping dispatcher");
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!(error = ?e, "Dispatcher was not running"),
        }
    });

    dispatcher.dispatch().await;

    info!("KuCoin earn bot stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}
