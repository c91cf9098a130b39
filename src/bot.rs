// ============================================================================
// Module : bot
// ============================================================================
// Branche les commandes Telegram sur le pipeline de taux
//
// Surface :
// - /start  : message d'accueil + bouton KuCoin
// - /help   : liste des commandes
// - /kucoin : une réponse avec les taux
// - /stop   : arrête les mises à jour de CE chat
// - bouton "KuCoin" : démarre les mises à jour périodiques + une réponse
// - tout autre texte : invite + bouton KuCoin
//
// CONCEPTS RUST :
// 1. dptree : arbre de handlers, la première branche qui accepte gagne
// 2. #[derive(BotCommands)] : parsing "/commande" généré
// 3. Arc / Weak : la tâche périodique ne garde pas App en vie
// ============================================================================

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, ParseMode};
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::ui::keyboards::{
    exchange_keyboard, stop_text, HELP_TEXT, KUCOIN_BUTTON, SELECT_EXCHANGE_TEXT, WELCOME_TEXT,
};

/// Commandes reconnues par le bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "list the commands")]
    Help,
    #[command(description = "retrieve KuCoin earn rates")]
    Kucoin,
    #[command(description = "stop the periodic updates")]
    Stop,
}

/// Arbre des handlers, passé au Dispatcher
pub fn schema() -> UpdateHandler<RequestError> {
    let commands = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command);

    let text = Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(handle_text);

    let buttons = Update::filter_callback_query().endpoint(handle_callback);

    dptree::entry().branch(commands).branch(text).branch(buttons)
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, app: Arc<App>) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    info!(chat_id = chat_id.0, command = ?cmd, "Received command");

    match cmd {
        Command::Start => {
            bot.send_message(chat_id, WELCOME_TEXT)
                .reply_markup(exchange_keyboard())
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, HELP_TEXT)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Kucoin => {
            send_rates(&bot, chat_id, &app).await?;
        }
        Command::Stop => {
            let started_at = app.refresh().stop(chat_id);
            bot.send_message(chat_id, stop_text(started_at)).await?;
        }
    }

    Ok(())
}

async fn handle_text(bot: Bot, msg: Message) -> ResponseResult<()> {
    debug!(chat_id = msg.chat.id.0, "Received message from chat");

    bot.send_message(msg.chat.id, SELECT_EXCHANGE_TEXT)
        .reply_markup(exchange_keyboard())
        .await?;

    Ok(())
}

async fn handle_callback(bot: Bot, query: CallbackQuery, app: Arc<App>) -> ResponseResult<()> {
    // Toujours répondre au callback pour retirer l'indicateur de chargement
    bot.answer_callback_query(&query.id).await?;

    if query.data.as_deref() != Some(KUCOIN_BUTTON) {
        debug!(data = ?query.data, "Ignoring unknown callback");
        return Ok(());
    }

    let chat_id = match query.message.as_ref() {
        Some(message) => message.chat().id,
        None => {
            warn!("KuCoin callback without message context");
            return Ok(());
        }
    };

    start_updates(&bot, chat_id, &app);
    send_rates(&bot, chat_id, &app).await?;

    Ok(())
}

/// Démarre les mises à jour périodiques d'un chat
///
/// La tâche tient un Weak<App> : App possède le registre qui possède la
/// tâche, un Arc créerait un cycle.
fn start_updates(bot: &Bot, chat_id: ChatId, app: &Arc<App>) {
    let bot = bot.clone();
    let weak = Arc::downgrade(app);

    app.refresh().start(chat_id, app.refresh_interval(), move || {
        let bot = bot.clone();
        let app = weak.upgrade();
        async move {
            if let Some(app) = app {
                send_rates(&bot, chat_id, &app).await?;
            }
            Ok::<(), anyhow::Error>(())
        }
    });
}

/// Une réponse /kucoin : fetch, transform, render puis envoi en HTML
///
/// Une réponse trop longue part en plusieurs messages, dans l'ordre.
async fn send_rates(bot: &Bot, chat_id: ChatId, app: &App) -> ResponseResult<()> {
    for text in app.rates_reply().await {
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            })
            .await?;
    }

    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/kucoin", "earn_bot").unwrap(), Command::Kucoin);
        assert_eq!(Command::parse("/stop", "earn_bot").unwrap(), Command::Stop);
        assert_eq!(Command::parse("/help", "earn_bot").unwrap(), Command::Help);
        assert_eq!(Command::parse("/start", "earn_bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/kucoin@earn_bot", "earn_bot").unwrap(),
            Command::Kucoin
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/binance", "earn_bot").is_err());
        assert!(Command::parse("hello", "earn_bot").is_err());
    }

    #[test]
    fn test_command_list() {
        let commands = Command::bot_commands();
        let names: Vec<&str> = commands
            .iter()
            .map(|c| c.command.trim_start_matches('/'))
            .collect();
        assert_eq!(names, ["start", "help", "kucoin", "stop"]);
    }
}
