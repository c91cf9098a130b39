// ============================================================================
// Configuration
// ============================================================================
// Lue depuis l'environnement (et un fichier .env optionnel, chargé par main)
//
// Variables :
// - TELEGRAM_BOT_API_KEY  (obligatoire) : token du bot donné par @BotFather
// - KUCOIN_RATES_URL      (optionnel)   : endpoint des produits Earn
// - REFRESH_INTERVAL_SECS (optionnel)   : période des mises à jour, 900 par défaut
// - LOG_DIR               (optionnel)   : répertoire des fichiers de logs
//
// CONCEPT RUST : injection de la source
// - from_env() lit std::env
// - from_lookup() prend une closure : les tests n'ont pas à modifier
//   l'environnement du process (partagé entre tests parallèles)
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::api::DEFAULT_RATES_URL;

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_API_KEY";
pub const RATES_URL_VAR: &str = "KUCOIN_RATES_URL";
pub const REFRESH_INTERVAL_VAR: &str = "REFRESH_INTERVAL_SECS";
pub const LOG_DIR_VAR: &str = "LOG_DIR";

/// 15 minutes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Configuration du bot
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub rates_url: String,
    pub refresh_interval: Duration,
}

// Debug écrit à la main : le token ne doit jamais finir dans les logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("rates_url", &self.rates_url)
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

impl Config {
    /// Lit la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lit la configuration via une fonction de recherche clé -> valeur
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Une valeur vide compte comme absente
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get(BOT_TOKEN_VAR)
            .with_context(|| format!("{} is not set", BOT_TOKEN_VAR))?;

        let rates_url = get(RATES_URL_VAR).unwrap_or_else(|| DEFAULT_RATES_URL.to_string());

        let refresh_interval = match get(REFRESH_INTERVAL_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("{} must be a number of seconds, got {:?}", REFRESH_INTERVAL_VAR, raw))?;
                if secs == 0 {
                    bail!("{} must be greater than zero", REFRESH_INTERVAL_VAR);
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REFRESH_INTERVAL,
        };

        Ok(Self {
            bot_token,
            rates_url,
            refresh_interval,
        })
    }
}

/// Répertoire des logs
///
/// Lu séparément de Config : le logging démarre avant la lecture du token,
/// pour que l'absence du token soit elle-même loggée.
///
/// - LOG_DIR si défini
/// - sinon Linux : ~/.local/share/kucoin-earn-bot/logs
/// - sinon ./logs
pub fn log_dir_from_env() -> PathBuf {
    log_dir_from_lookup(|key| std::env::var(key).ok())
}

pub fn log_dir_from_lookup<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(LOG_DIR_VAR).filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::data_local_dir()
        .map(|base| base.join("kucoin-earn-bot").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

// ============================================================================
// Tests unitaires
// ============================================================================
