//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message};

use super::commands::{handle_cancel, handle_favorites, handle_start};
use super::messages::handle_text;
use super::types::{HandlerDeps, HandlerError, IncomingMessage};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; every other private text message goes to the
/// link handler.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                let incoming = IncomingMessage::from_message(&msg);

                match cmd {
                    Command::Start => handle_start(&deps, &incoming).await?,
                    Command::Cancel => handle_cancel(&deps, &incoming).await?,
                    Command::Favorites => handle_favorites(&deps, &incoming).await?,
                }
                Ok(())
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some() && matches!(msg.chat.kind, ChatKind::Private(_)))
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                let incoming = IncomingMessage::from_message(&msg);
                handle_text(&deps, &incoming).await
            }
        })
}
