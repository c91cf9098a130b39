// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées du pipeline fetch -> transform -> render
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display + std::error::Error depuis des attributs
// 2. #[from] : conversion automatique utilisable avec l'opérateur ?
// 3. #[source] : chaîne d'erreurs (la cause reste accessible)
//
// Trois familles d'erreurs :
// - Transport : l'appel HTTP n'a pas abouti ou a retourné un statut d'erreur
// - MalformedNumber : un champ APR n'est pas un nombre
// - UnmappedStatus : un statut de produit inconnu
//
// Toutes remontent jusqu'au handler Telegram qui les transforme en message
// d'erreur lisible pour l'utilisateur.
// ============================================================================

use thiserror::Error;

/// Échec de la récupération des taux auprès de KuCoin
#[derive(Debug, Error)]
pub enum TransportError {
    /// La requête n'a pas abouti (DNS, TLS, connexion coupée...)
    #[error("request to the rates endpoint failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Le serveur a répondu avec un statut non-succès
    #[error("rates endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Le corps de la réponse n'a pas la forme attendue
    #[error("rates endpoint returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Erreur du pipeline de taux
#[derive(Debug, Error)]
pub enum RatesError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Un champ APR ne se parse pas en nombre fini
    #[error("product {product_id}: field `{field}` is not a number: {value:?}")]
    MalformedNumber {
        product_id: String,
        field: &'static str,
        value: String,
    },

    /// Statut de produit hors de FULL / ONGOING / INTERESTING
    #[error("product {product_id}: unknown status {value:?}")]
    UnmappedStatus { product_id: String, value: String },
}

/// Alias pratique, comme anyhow::Result mais pour le domaine
pub type Result<T> = std::result::Result<T, RatesError>;
