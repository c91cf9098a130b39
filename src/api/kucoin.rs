// ============================================================================
// API Client : KuCoin Earn
// ============================================================================
// Récupère les produits d'épargne (staking, demand...) depuis KuCoin
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : erreurs typées, propagées avec ?
// 3. Serde : désérialisation JSON automatique
// 4. reqwest::Client : pool de connexions réutilisé entre les requêtes
// ============================================================================

use tracing::{debug, error, info, instrument};

use crate::error::{Result, TransportError};
use crate::models::ProviderResponse;

/// Endpoint public des produits "pool-staking"
pub const DEFAULT_RATES_URL: &str =
    "https://www.kucoin.com/_pxapi/pool-staking/v3/products/currencies";

/// Client HTTP pour l'endpoint de taux KuCoin
///
/// CONCEPT RUST : Clone bon marché
/// - reqwest::Client est un Arc interne
/// - Cloner le client partage le même pool de connexions
#[derive(Debug, Clone)]
pub struct KucoinClient {
    client: reqwest::Client,
    url: String,
}

impl KucoinClient {
    /// Crée le client avec l'URL donnée
    ///
    /// Ajout d'un User-Agent de navigateur : l'endpoint est celui du site web.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(TransportError::Request)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// URL interrogée par fetch()
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Récupère la réponse brute de KuCoin
    ///
    /// Aucune normalisation ici : le payload est rendu tel quel.
    /// Échoue avec TransportError si :
    /// - la requête n'aboutit pas
    /// - le statut HTTP n'est pas un succès (200-299)
    /// - le corps n'est pas le JSON attendu
    ///
    /// Pas de retry, pas de cache, pas de timeout.
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Macro tracing qui ajoute automatiquement un span
    /// - Tous les logs à l'intérieur auront le contexte de l'URL
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<ProviderResponse> {
        debug!("Sending HTTP request to KuCoin");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Statut non-succès : échec explicite, jamais de résultat factice
        if !status.is_success() {
            error!(status = %status, "KuCoin returned error status");
            return Err(TransportError::Status(status).into());
        }

        // CONCEPT RUST : Serde deserialization
        // - .json::<T>() désérialise automatiquement le JSON vers le type T
        let payload: ProviderResponse = response
            .json()
            .await
            .map_err(TransportError::Decode)?;

        info!(currencies = payload.data.len(), "Fetched KuCoin earn products");
        Ok(payload)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
