//! # Chat Relay
//!
//! Renders items and reaction outcomes as markdown and posts them to a chat room.

use crate::application::engine::ReactionPayload;
use crate::application::item::Item;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Category, ItemKind};
use crate::strings::messages;

/// Markdown announcement of a freshly polled item.
pub async fn item_message(item: &Item) -> String {
    let source = item.source().name();
    let kind = item.kind().label();

    match item.kind() {
        ItemKind::Submission | ItemKind::Comment => {
            let author = item.author_name().await;
            let url = item.url();
            let header = if item.category() == Category::Reports {
                messages::reported_notice(kind, source, &author, &url)
            } else {
                messages::item_notice(kind, source, &author, &url)
            };
            match item.title() {
                Some(title) => format!("{header}\n\n**Title:** {title}\n**Body:**\n{}", item.body()),
                None => format!("{header}\n\n**Body:**\n{}", item.body()),
            }
        }
        ItemKind::MailMessage | ItemKind::MailConversation => {
            let author = item.author_name().await;
            let subject = item.raw().text("subject").unwrap_or_default();
            messages::modmail_notice(subject, source, &author, &item.body())
        }
        ItemKind::ModAction => {
            messages::mod_action_notice(&item.actor_name().await, source, &item.body())
        }
    }
}

/// Posts an item to the room. Returns the id of the sent message.
pub async fn forward_item(chat: &dyn ChatProvider, item: &Item) -> Result<String, String> {
    let message = item_message(item).await;
    chat.send_message(&message).await
}

/// Posts the summary of an applied reaction.
pub async fn report_payload(chat: &dyn ChatProvider, payload: &ReactionPayload) -> Result<(), String> {
    chat.send_notification(&payload.summary().await).await
}
