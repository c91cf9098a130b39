// ============================================================================
// Claviers et textes fixes du bot
// ============================================================================

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Libellé ET donnée de callback du bouton KuCoin
pub const KUCOIN_BUTTON: &str = "KuCoin";

pub const WELCOME_TEXT: &str = "Welcome";

/// Réponse à un message libre
pub const SELECT_EXCHANGE_TEXT: &str = "Hey! Please select CEX to see the earn rates";

pub const HELP_TEXT: &str = "<b>Commands</b>\n\
    1. /kucoin - retrieves KuCoin rates\n\
    2. Tap the KuCoin button to also get updates every 15 minutes\n\
    3. /stop - stops the updates\n\
    4. /help - shows this message";

/// Clavier inline avec un seul bouton : l'exchange KuCoin
pub fn exchange_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        KUCOIN_BUTTON,
        KUCOIN_BUTTON,
    )]])
}

/// Confirmation d'arrêt des mises à jour
///
/// `started_at` vaut None si aucune mise à jour ne tournait pour ce chat.
pub fn stop_text(started_at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match started_at {
        Some(at) => format!(
            "Updates are paused (they were running since {} UTC)",
            at.format("%Y-%m-%d %H:%M")
        ),
        None => "Updates are paused".to_string(),
    }
}
