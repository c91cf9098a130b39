// ============================================================================
// Structure : App
// ============================================================================
// État partagé par tous les handlers du bot
//
// CONCEPTS RUST :
// 1. Arc<App> : une seule instance, partagée entre les tâches tokio
// 2. Pas de Mutex autour de App : les champs sont soit immuables
//    (client, période), soit synchronisés en interne (RefreshRegistry)
//
// PATTERN : "Application State" injecté comme dépendance du dispatcher
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::error;

use crate::api::KucoinClient;
use crate::config::Config;
use crate::error::RatesError;
use crate::models::CoinOffer;
use crate::refresh::RefreshRegistry;
use crate::transform::transform;
use crate::ui::compose_reply;

/// État principal du bot
pub struct App {
    client: KucoinClient,
    refresh: RefreshRegistry,
    refresh_interval: Duration,
}

impl App {
    /// Crée l'état depuis la configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = KucoinClient::new(config.rates_url.as_str())
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            refresh: RefreshRegistry::new(),
            refresh_interval: config.refresh_interval,
        })
    }

    /// Fetch + transformation : les offres prêtes à afficher
    pub async fn fetch_offers(&self) -> Result<Vec<CoinOffer>, RatesError> {
        let response = self.client.fetch().await?;
        transform(response)
    }

    /// Cycle complet fetch -> transform -> render
    ///
    /// Ne peut pas échouer : une erreur devient un message pour l'utilisateur
    /// et le détail part dans les logs. Retourne au moins un message.
    pub async fn rates_reply(&self) -> Vec<String> {
        let result = self.fetch_offers().await;
        if let Err(e) = &result {
            error!(error = %e, "Failed to build KuCoin rates");
        }
        compose_reply(result)
    }

    pub fn refresh(&self) -> &RefreshRegistry {
        &self.refresh
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

// ============================================================================
// Tests
// ============================================================================
