// ============================================================================
// Structures : ProviderResponse, RawCurrency, RawProduct
// ============================================================================
// Représentent la réponse brute de l'endpoint KuCoin "pool-staking"
//
// CONCEPTS RUST :
// 1. #[derive(Deserialize)] : serde génère le parsing JSON
// 2. serde_json::Value : champ "n'importe quel JSON", typé plus tard
// 3. FromStr : conversion texte -> enum, le pendant de Display
//
// Les champs des enregistrements sont volontairement lâches : une devise
// hors liste ou un produit à identifiant non numérique peut avoir n'importe
// quelle forme, il sera ignoré. Seuls les produits retenus sont validés,
// au moment de la transformation.
//
// Ces structures vivent le temps d'une requête : créées par le fetch,
// consommées par la transformation, puis jetées.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RatesError, Result};

/// Réponse complète de l'API (enveloppe `data`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub data: Vec<RawCurrency>,
}

/// Une devise et ses produits, dans l'ordre donné par KuCoin
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCurrency {
    /// Code de la devise (ex: "USDT")
    #[serde(default)]
    pub currency: Value,

    /// Tableau de produits (toute autre forme = aucun produit)
    #[serde(default)]
    pub products: Value,
}

impl RawCurrency {
    /// Code de la devise, si c'est bien un texte
    pub fn code(&self) -> Option<&str> {
        self.currency.as_str()
    }

    /// Produits dans l'ordre KuCoin
    ///
    /// Les éléments qui ne sont pas des objets JSON sont ignorés.
    pub fn products(&self) -> Vec<RawProduct> {
        self.products
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .filter_map(|item| RawProduct::deserialize(item).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Un produit d'épargne tel que retourné par KuCoin
///
/// Attendu : product_id, category_text, apr, pol_apr et status en texte,
/// duration en entier. Rien n'est vérifié au décodage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    /// Identifiant produit, parfois non numérique (ces produits sont ignorés)
    #[serde(default)]
    pub product_id: Value,

    /// Libellé de catégorie (ex: "Demand", "Staking")
    #[serde(default)]
    pub category_text: Value,

    /// APR nominal
    #[serde(default)]
    pub apr: Value,

    /// APR supplémentaire (bonus). Absent ou null = 0
    #[serde(default)]
    pub pol_apr: Value,

    /// Statut brut (FULL | ONGOING | INTERESTING)
    #[serde(default)]
    pub status: Value,

    /// Durée en jours : -1 = fixe, 0 = flexible
    #[serde(default)]
    pub duration: Value,
}

/// Cycle de vie d'un produit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    /// Quota épuisé
    Full,
    /// Souscription ouverte
    Ongoing,
    /// Campagne terminée
    Interesting,
}

impl FromStr for ProductStatus {
    /// La valeur inconnue est rendue telle quelle pour le message d'erreur
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FULL" => Ok(ProductStatus::Full),
            "ONGOING" => Ok(ProductStatus::Ongoing),
            "INTERESTING" => Ok(ProductStatus::Interesting),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            ProductStatus::Full => "FULL",
            ProductStatus::Ongoing => "ONGOING",
            ProductStatus::Interesting => "INTERESTING",
        };
        f.write_str(raw)
    }
}

/// Parse un texte en nombre fini ("NaN", "inf", "0x1A" et "" sont refusés)
///
/// CONCEPT RUST : Option combinators
/// - .ok() : Result -> Option (on jette l'erreur de parsing)
/// - .filter() : garde la valeur seulement si le prédicat est vrai
pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Nombre fini depuis un texte ("3.5") ou un nombre JSON (3.5)
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_finite(s),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Texte lisible d'une valeur brute pour les messages d'erreur
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RawProduct {
    /// Identifiant tel qu'affiché dans les erreurs
    pub fn id(&self) -> String {
        text_of(&self.product_id)
    }

    /// Vrai si l'identifiant est un nombre (seuls ces produits sont affichés)
    pub fn has_numeric_id(&self) -> bool {
        number_of(&self.product_id).is_some()
    }

    /// Libellé de catégorie, vide s'il manque
    pub fn category(&self) -> String {
        self.category_text.as_str().unwrap_or_default().to_string()
    }

    /// Statut typé, ou UnmappedStatus si KuCoin a introduit une nouvelle valeur
    pub fn status(&self) -> Result<ProductStatus> {
        let unmapped = |value: String| RatesError::UnmappedStatus {
            product_id: self.id(),
            value,
        };

        match &self.status {
            Value::String(raw) => raw.parse().map_err(unmapped),
            other => Err(unmapped(other.to_string())),
        }
    }

    /// Durée en jours (entier obligatoire)
    pub fn duration(&self) -> Result<i64> {
        self.duration
            .as_i64()
            .ok_or_else(|| self.malformed("duration", &self.duration))
    }

    /// APR nominal + APR supplémentaire
    ///
    /// Un champ illisible est une erreur explicite : un NaN silencieux
    /// casserait le tri. Un apr absent ou null est aussi une erreur,
    /// un pol_apr absent ou null vaut 0.
    pub fn combined_apr(&self) -> Result<f64> {
        let nominal = self.rate("apr", &self.apr)?;
        let supplemental = match &self.pol_apr {
            Value::Null => 0.0,
            raw => self.rate("pol_apr", raw)?,
        };
        Ok(nominal + supplemental)
    }

    fn rate(&self, field: &'static str, raw: &Value) -> Result<f64> {
        number_of(raw).ok_or_else(|| self.malformed(field, raw))
    }

    fn malformed(&self, field: &'static str, raw: &Value) -> RatesError {
        RatesError::MalformedNumber {
            product_id: self.id(),
            field,
            value: text_of(raw),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: &str, apr: &str, pol_apr: Option<&str>, status: &str) -> RawProduct {
        serde_json::from_value(json!({
            "product_id": id,
            "category_text": "Demand",
            "apr": apr,
            "pol_apr": pol_apr,
            "status": status,
            "duration": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_provider_payload() {
        let payload = json!({
            "success": true,
            "data": [{
                "currency": "USDT",
                "products": [{
                    "product_id": "1",
                    "category_text": "Demand",
                    "name": "USDT Savings",
                    "apr": "3.5",
                    "pol_apr": "1.5",
                    "status": "ONGOING",
                    "duration": 0
                }]
            }]
        });

        let response: ProviderResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].code(), Some("USDT"));

        let products = response.data[0].products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id(), "1");
        assert_eq!(products[0].category(), "Demand");
        assert_eq!(products[0].duration().unwrap(), 0);
    }

    #[test]
    fn test_odd_records_still_decode() {
        // Champs null, manquants ou de mauvais type : le décodage passe
        let payload = json!({
            "data": [
                { "currency": "DOGE", "products": [{ "product_id": "x", "apr": null }] },
                { "currency": 42, "products": "none" },
                { "currency": "USDT", "products": [
                    { "product_id": "promo", "apr": null },
                    "not-an-object",
                    { "product_id": "3", "apr": "1", "status": "FULL", "duration": 7 }
                ]}
            ]
        });

        let response: ProviderResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.data.len(), 3);
        assert_eq!(response.data[1].code(), None);
        assert!(response.data[1].products().is_empty());
        assert_eq!(response.data[2].products().len(), 2);
    }

    #[test]
    fn test_missing_pol_apr_counts_as_zero() {
        let p: RawProduct = serde_json::from_value(json!({
            "product_id": "7",
            "apr": "2",
            "pol_apr": null,
            "status": "FULL",
            "duration": 30
        }))
        .unwrap();

        assert_eq!(p.category(), "");
        assert_eq!(p.combined_apr().unwrap(), 2.0);
    }

    #[test]
    fn test_numeric_id() {
        assert!(product("123", "1", None, "FULL").has_numeric_id());
        assert!(product(" 12.5 ", "1", None, "FULL").has_numeric_id());
        assert!(product("1e3", "1", None, "FULL").has_numeric_id());
        assert!(!product("abc", "1", None, "FULL").has_numeric_id());
        assert!(!product("NaN", "1", None, "FULL").has_numeric_id());
        assert!(!product("", "1", None, "FULL").has_numeric_id());
        // Pas de notation hexadécimale : seuls les décimaux sont des nombres
        assert!(!product("0x1A", "1", None, "FULL").has_numeric_id());

        let numeric: RawProduct = serde_json::from_value(json!({ "product_id": 15 })).unwrap();
        assert!(numeric.has_numeric_id());
        assert!(!RawProduct::default().has_numeric_id());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("FULL".parse::<ProductStatus>(), Ok(ProductStatus::Full));
        assert_eq!("ONGOING".parse::<ProductStatus>(), Ok(ProductStatus::Ongoing));
        assert_eq!(
            "INTERESTING".parse::<ProductStatus>(),
            Ok(ProductStatus::Interesting)
        );
        assert_eq!(ProductStatus::Ongoing.to_string(), "ONGOING");

        let err = product("9", "1", None, "PAUSED").status().unwrap_err();
        match err {
            RatesError::UnmappedStatus { product_id, value } => {
                assert_eq!(product_id, "9");
                assert_eq!(value, "PAUSED");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let missing: RawProduct = serde_json::from_value(json!({ "product_id": "9" })).unwrap();
        assert!(matches!(
            missing.status(),
            Err(RatesError::UnmappedStatus { .. })
        ));
    }

    #[test]
    fn test_combined_apr() {
        let apr = product("1", "3.5", Some("1.5"), "ONGOING").combined_apr().unwrap();
        assert!((apr - 5.0).abs() < 1e-9);

        let apr = product("1", "0.1", Some("0.2"), "ONGOING").combined_apr().unwrap();
        assert!((apr - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_apr_is_an_error() {
        let err = product("5", "abc", Some("1"), "ONGOING").combined_apr().unwrap_err();
        assert!(matches!(
            err,
            RatesError::MalformedNumber { field: "apr", .. }
        ));

        let err = product("5", "1", Some(""), "ONGOING").combined_apr().unwrap_err();
        assert!(matches!(
            err,
            RatesError::MalformedNumber { field: "pol_apr", .. }
        ));
    }

    #[test]
    fn test_null_apr_is_an_error() {
        let p: RawProduct = serde_json::from_value(json!({
            "product_id": "8",
            "apr": null,
            "status": "ONGOING",
            "duration": 0
        }))
        .unwrap();

        match p.combined_apr().unwrap_err() {
            RatesError::MalformedNumber { product_id, field, value } => {
                assert_eq!(product_id, "8");
                assert_eq!(field, "apr");
                assert_eq!(value, "null");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duration_must_be_an_integer() {
        let p: RawProduct = serde_json::from_value(json!({ "product_id": "4", "duration": "30" })).unwrap();
        assert!(matches!(
            p.duration(),
            Err(RatesError::MalformedNumber { field: "duration", .. })
        ));
        assert!(RawProduct::default().duration().is_err());
    }
}
