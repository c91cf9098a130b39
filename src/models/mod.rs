// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// - product : réponse brute de KuCoin (vit le temps d'une requête)
// - offer : offres normalisées, prêtes à être affichées
// ============================================================================

pub mod offer;   // Offres dérivées (fichier offer.rs)
pub mod product; // Enregistrements bruts (fichier product.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use kucoin_earn_bot::models::offer::Offer;
// On peut faire : use kucoin_earn_bot::models::Offer;
pub use offer::{CoinOffer, Offer, SUBSCRIPTION_URL};
pub use product::{ProductStatus, ProviderResponse, RawCurrency, RawProduct};
