// ============================================================================
// Transformation : ProviderResponse -> Vec<CoinOffer>
// ============================================================================
// Filtre, convertit et trie les produits KuCoin
//
// CONCEPTS RUST :
// 1. Iterators : filter / map / collect, sans boucle manuelle
// 2. collect::<Result<Vec<_>>>() : s'arrête à la première erreur
// 3. sort_by : tri STABLE (les égalités gardent l'ordre d'origine)
// 4. f64::total_cmp : ordre total sur les flottants (pas de partial_cmp().unwrap())
//
// Fonction pure : aucune I/O, aucun état partagé.
// ============================================================================

use tracing::debug;

use crate::error::Result;
use crate::models::{CoinOffer, Offer, ProviderResponse, RawCurrency};

/// Devises affichées par le bot, dans aucun ordre particulier
pub const ALLOWED_CURRENCIES: [&str; 4] = ["USDT", "USDC", "SOL", "BNB"];

/// Vrai si la devise fait partie de la liste autorisée
pub fn is_allowed(currency: &str) -> bool {
    ALLOWED_CURRENCIES.contains(&currency)
}

/// Transforme la réponse brute en offres triées par devise
///
/// Étapes :
/// 1. garde les devises autorisées (ordre KuCoin conservé)
/// 2. ignore les produits dont l'identifiant n'est pas numérique
/// 3. convertit chaque produit en Offer (peut échouer)
/// 4. trie par APR décroissant, tri stable
pub fn transform(response: ProviderResponse) -> Result<Vec<CoinOffer>> {
    let total = response.data.len();

    let coins = response
        .data
        .into_iter()
        .filter(|coin| coin.code().is_some_and(is_allowed))
        .map(coin_offer)
        .collect::<Result<Vec<_>>>()?;

    debug!(received = total, kept = coins.len(), "Transformed provider response");
    Ok(coins)
}

/// Construit le CoinOffer d'une devise déjà autorisée
fn coin_offer(coin: RawCurrency) -> Result<CoinOffer> {
    let mut offers = coin
        .products()
        .iter()
        .filter(|product| product.has_numeric_id())
        .map(Offer::from_raw)
        .collect::<Result<Vec<_>>>()?;

    // b avant a : ordre décroissant
    offers.sort_by(|a, b| b.apr.total_cmp(&a.apr));

    Ok(CoinOffer {
        name: coin.code().unwrap_or_default().to_string(),
        offers,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RatesError;
    use serde_json::{json, Value};

    fn response(data: Value) -> ProviderResponse {
        serde_json::from_value(json!({ "data": data })).unwrap()
    }

    fn product(id: &str, apr: &str, category: &str) -> Value {
        json!({
            "product_id": id,
            "category_text": category,
            "apr": apr,
            "pol_apr": "0",
            "status": "ONGOING",
            "duration": 0
        })
    }

    #[test]
    fn test_single_flexible_offer() {
        let coins = transform(response(json!([{
            "currency": "USDT",
            "products": [{
                "product_id": "1",
                "category_text": "Demand",
                "apr": "3.5",
                "pol_apr": "1.5",
                "status": "ONGOING",
                "duration": 0
            }]
        }])))
        .unwrap();

        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].name, "USDT");
        assert_eq!(coins[0].offers.len(), 1);

        let offer = &coins[0].offers[0];
        assert_eq!(offer.term, "Flexible");
        assert!((offer.apr - 5.0).abs() < 1e-9);
        assert_eq!(offer.availability, "Available");
        assert!(offer.is_available);
        assert!(!offer.sub_url.is_empty());
    }

    #[test]
    fn test_non_numeric_product_is_dropped() {
        let coins = transform(response(json!([{
            "currency": "USDC",
            "products": [
                product("abc", "9", "Promo"),
                product("2", "1", "Demand")
            ]
        }])))
        .unwrap();

        assert_eq!(coins[0].offers.len(), 1);
        assert_eq!(coins[0].offers[0].description, "Demand");
    }

    #[test]
    fn test_unknown_currency_is_dropped() {
        let coins = transform(response(json!([
            { "currency": "DOGE", "products": [product("1", "50", "Demand")] },
            { "currency": "BNB", "products": [product("2", "1", "Demand")] }
        ])))
        .unwrap();

        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].name, "BNB");
    }

    #[test]
    fn test_currency_order_follows_provider() {
        let coins = transform(response(json!([
            { "currency": "SOL", "products": [] },
            { "currency": "ETH", "products": [] },
            { "currency": "USDT", "products": [] },
            { "currency": "BNB", "products": [] },
            { "currency": "USDC", "products": [] }
        ])))
        .unwrap();

        let names: Vec<&str> = coins.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["SOL", "USDT", "BNB", "USDC"]);
        assert!(coins.iter().all(CoinOffer::is_empty));
    }

    #[test]
    fn test_offers_sorted_by_apr_descending_and_stable() {
        let coins = transform(response(json!([{
            "currency": "USDT",
            "products": [
                product("1", "2", "first-two"),
                product("2", "8", "eight"),
                product("3", "2", "second-two"),
                product("4", "5", "five"),
                product("5", "2", "third-two")
            ]
        }])))
        .unwrap();

        let order: Vec<&str> = coins[0]
            .offers
            .iter()
            .map(|o| o.description.as_str())
            .collect();
        assert_eq!(
            order,
            ["eight", "five", "first-two", "second-two", "third-two"]
        );

        for pair in coins[0].offers.windows(2) {
            assert!(pair[0].apr >= pair[1].apr);
        }
    }

    #[test]
    fn test_malformed_apr_fails_whole_transform() {
        let err = transform(response(json!([{
            "currency": "SOL",
            "products": [
                product("1", "3", "Demand"),
                product("2", "three", "Staking")
            ]
        }])))
        .unwrap_err();

        match err {
            RatesError::MalformedNumber { product_id, field, value } => {
                assert_eq!(product_id, "2");
                assert_eq!(field, "apr");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_filtered_products_are_not_validated() {
        // Produit non numérique avec un APR invalide : ignoré, pas d'erreur
        let coins = transform(response(json!([{
            "currency": "USDT",
            "products": [product("promo", "n/a", "Promo")]
        }])))
        .unwrap();

        assert!(coins[0].is_empty());
    }

    #[test]
    fn test_null_fields_on_dropped_products_are_ignored() {
        let payload: ProviderResponse = serde_json::from_str(
            r#"{"data": [
                {"currency": "DOGE", "products": [{"product_id": "x", "apr": null}]},
                {"currency": "USDT", "products": [
                    {"product_id": "promo", "apr": null},
                    {"product_id": "1", "category_text": "Demand", "apr": "3.5",
                     "pol_apr": "1.5", "status": "ONGOING", "duration": 0}
                ]}
            ]}"#,
        )
        .unwrap();

        let coins = transform(payload).unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].name, "USDT");
        assert_eq!(coins[0].offers.len(), 1);
        assert!((coins[0].offers[0].apr - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_apr_on_kept_product_is_an_error() {
        let err = transform(response(json!([{
            "currency": "BNB",
            "products": [{ "product_id": "4", "apr": null, "status": "FULL", "duration": 0 }]
        }])))
        .unwrap_err();

        assert!(matches!(
            err,
            RatesError::MalformedNumber { field: "apr", .. }
        ));
    }

    #[test]
    fn test_disallowed_currency_is_not_validated() {
        let coins = transform(response(json!([{
            "currency": "DOGE",
            "products": [{
                "product_id": "1",
                "apr": "1",
                "status": "WHATEVER",
                "duration": 0
            }]
        }])))
        .unwrap();

        assert!(coins.is_empty());
    }
}
