//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::chat::CallbackAction;
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first, then plain text (prompt answers), then
/// inline button presses.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_text = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(text_handler(deps_text))
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id.0;
                let message = Some(msg.id.0);
                log::info!("Received command {:?} from chat {}", cmd, chat_id);

                let conversation = &deps.conversation;
                let result = match cmd {
                    Command::Start => conversation.on_start(chat_id, message).await,
                    Command::Menu => conversation.on_menu(chat_id, message).await,
                    Command::Send => conversation.on_send(chat_id, message).await,
                    Command::Priorities => conversation.on_priorities(chat_id, message).await,
                };

                if let Err(e) = result {
                    log::error!("Command {:?} failed for chat {}: {}", cmd, chat_id, e);
                }
                Ok(())
            }
        },
    ))
}

fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.text().map(str::to_owned))
        .endpoint(move |msg: Message, text: String| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id.0;
                if let Err(e) = deps.conversation.on_text(chat_id, Some(msg.id.0), &text).await {
                    log::error!("Text handling failed for chat {}: {}", chat_id, e);
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the client's loading indicator whatever happens next
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query: {}", e);
            }

            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id.0) else {
                log::warn!("Callback without message from user {}", q.from.id);
                return Ok(());
            };
            let Some(data) = q.data.as_deref() else {
                return Ok(());
            };

            let action = match data.parse::<CallbackAction>() {
                Ok(action) => action,
                Err(e) => {
                    log::warn!("Rejected callback from chat {}: {}", chat_id, e);
                    return Ok(());
                }
            };

            if let Err(e) = deps.conversation.on_callback(chat_id, action).await {
                log::error!("Callback '{}' failed for chat {}: {}", data, chat_id, e);
            }
            Ok(())
        }
    })
}
