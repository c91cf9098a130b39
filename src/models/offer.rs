// ============================================================================
// Structures : Offer, CoinOffer
// ============================================================================
// Offres normalisées, prêtes à être affichées
//
// CONCEPTS RUST :
// 1. Immutabilité : une Offer est construite une fois puis seulement lue
// 2. &'static str : l'URL de souscription est une constante du binaire
// 3. Result + ? : la construction échoue proprement si la donnée est invalide
// ============================================================================

use crate::error::Result;
use crate::models::product::{ProductStatus, RawProduct};

/// Page de souscription commune à toutes les offres
pub const SUBSCRIPTION_URL: &str = "https://www.kucoin.com/earn";

/// Une offre d'épargne pour une devise
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    /// "Fixed", "Flexible" ou "{n} days"
    pub term: String,

    /// Vrai seulement si la souscription est ouverte (ONGOING)
    pub is_available: bool,

    /// "Sold Out", "Available" ou "Ended"
    pub availability: &'static str,

    /// APR combiné (nominal + supplémentaire), en pourcentage
    pub apr: f64,

    /// Libellé de catégorie recopié tel quel
    pub description: String,

    pub sub_url: &'static str,
}

/// Une devise et ses offres triées par APR décroissant
#[derive(Debug, Clone, PartialEq)]
pub struct CoinOffer {
    pub name: String,
    pub offers: Vec<Offer>,
}

/// Libellé de durée
///
/// -1 et 0 sont des valeurs sentinelles côté KuCoin.
pub fn term_label(duration: i64) -> String {
    match duration {
        -1 => "Fixed".to_string(),
        0 => "Flexible".to_string(),
        days => format!("{} days", days),
    }
}

/// Libellé de disponibilité
pub fn availability_label(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Full => "Sold Out",
        ProductStatus::Ongoing => "Available",
        ProductStatus::Interesting => "Ended",
    }
}

impl Offer {
    /// Construit une offre depuis un produit brut
    ///
    /// C'est ici, et seulement ici, que les champs bruts sont validés.
    /// Échoue avec UnmappedStatus ou MalformedNumber, jamais avec un NaN.
    pub fn from_raw(product: &RawProduct) -> Result<Self> {
        let status = product.status()?;
        let apr = product.combined_apr()?;
        let duration = product.duration()?;

        Ok(Self {
            term: term_label(duration),
            is_available: status == ProductStatus::Ongoing,
            availability: availability_label(status),
            apr,
            description: product.category(),
            sub_url: SUBSCRIPTION_URL,
        })
    }
}

impl CoinOffer {
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
