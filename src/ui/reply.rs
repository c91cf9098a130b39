// ============================================================================
// Rendu : Vec<CoinOffer> -> message HTML Telegram
// ============================================================================
// Construit le tableau texte envoyé en réponse à /kucoin
//
// Format d'une devise :
//
//   <b>USDT</b>
//   1 | 5.00% | Flexible | Demand | Available | <a href="...">[Sub]</a>
//   2 | 3.10% | 30 days | Staking | Sold Out |
//
// CONCEPTS RUST :
// 1. fmt::Write : écrire dans une String avec write!/writeln!
// 2. {:.2} : arrondi à deux décimales de la valeur binaire exacte
//    (5.005 est stocké 5.00499999... et s'affiche donc "5.00")
// 3. chars().count() : longueur en caractères, pas en octets
//
// Telegram refuse les messages de plus de 4096 caractères : une réponse
// trop longue est découpée entre deux devises.
// ============================================================================

use std::fmt::Write;

use teloxide::utils::html;

use crate::error::RatesError;
use crate::models::{CoinOffer, Offer};

/// Réponse envoyée quand le pipeline échoue
pub const ERROR_REPLY: &str = "⚠️ Could not retrieve rates right now. Please try again later.";

/// Réponse envoyée quand aucune devise autorisée n'est présente
pub const EMPTY_REPLY: &str = "No earn offers available right now.";

/// Taille maximale d'un message Telegram
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Formate un APR avec exactement deux décimales et un "%"
pub fn format_apr(apr: f64) -> String {
    format!("{:.2}%", apr)
}

/// Rend la liste des offres en HTML Telegram
///
/// Une en-tête en gras par devise, puis une ligne numérotée à partir de 1
/// par offre. Le lien [Sub] n'apparaît que pour les offres disponibles.
/// Fonction pure : retourne une chaîne vide pour une liste vide.
pub fn render(coins: &[CoinOffer]) -> String {
    let blocks: Vec<String> = coins.iter().map(render_coin).collect();
    blocks.join("\n")
}

fn render_coin(coin: &CoinOffer) -> String {
    let mut text = String::new();
    // CONCEPT RUST : write! sur String ne peut pas échouer
    let _ = writeln!(text, "<b>{}</b>", html::escape(&coin.name));

    for (idx, offer) in coin.offers.iter().enumerate() {
        let _ = writeln!(text, "{}", render_offer(idx + 1, offer));
    }

    text
}

fn render_offer(rank: usize, offer: &Offer) -> String {
    let sub_link = if offer.is_available {
        format!("<a href=\"{}\">[Sub]</a>", html::escape(offer.sub_url))
    } else {
        String::new()
    };

    format!(
        "{} | {} | {} | {} | {} | {}",
        rank,
        format_apr(offer.apr),
        html::escape(&offer.term),
        html::escape(&offer.description),
        offer.availability,
        sub_link
    )
    .trim_end()
    .to_string()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Regroupe des blocs (un par devise) en messages d'au plus `limit` caractères
///
/// Les blocs d'un même message sont séparés par "\n", comme dans render().
/// Un bloc trop long à lui seul est coupé entre deux lignes ; une ligne
/// trop longue à elle seule est coupée au caractère près.
pub fn split_blocks(blocks: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for block in blocks {
        let sep = if current.is_empty() { "" } else { "\n" };
        if char_len(&current) + sep.len() + char_len(block) <= limit {
            current.push_str(sep);
            current.push_str(block);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        for line in block.split_inclusive('\n') {
            for piece in split_line(line, limit) {
                if !current.is_empty() && char_len(&current) + char_len(&piece) > limit {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push_str(&piece);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_line(line: &str, limit: usize) -> Vec<String> {
    if char_len(line) <= limit {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Messages à envoyer à partir du résultat du pipeline, dans l'ordre
///
/// - erreur : message générique (le détail va dans les logs)
/// - aucune devise : message explicite (Telegram refuse un texte vide)
/// - sinon : le rendu, découpé en messages de MAX_MESSAGE_CHARS au plus
pub fn compose_reply(result: Result<Vec<CoinOffer>, RatesError>) -> Vec<String> {
    match result {
        Ok(coins) if coins.is_empty() => vec![EMPTY_REPLY.to_string()],
        Ok(coins) => {
            let blocks: Vec<String> = coins.iter().map(render_coin).collect();
            split_blocks(&blocks, MAX_MESSAGE_CHARS)
        }
        Err(_) => vec![ERROR_REPLY.to_string()],
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
