//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes ban messages, reply disclaimers and audit summaries.

/// Name shown for authors whose account or content is gone.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Acting user recorded when the bot acts on its own.
pub const BOT_USER: &str = "Banhammer";

pub const BAN_REASON: &str = "Breaking Rules";
pub const BAN_NOTE: &str = "Banhammer Ban";

pub fn bot_disclaimer(contact_url: &str) -> String {
    format!(
        "*I am a bot, and this action was performed automatically. Please [contact the moderators of this subreddit]({contact_url}) if you have any questions or concerns.*"
    )
}

/// Appends the bot disclaimer to a reply posted on behalf of the moderators.
pub fn reply_with_disclaimer(reply: &str, contact_url: &str) -> String {
    format!("{reply}\n\n{}", bot_disclaimer(contact_url))
}

pub fn ban_message(item_url: &str, permanent: bool, contact_url: &str) -> String {
    let ban_type = if permanent { "permanent" } else { "temporary" };
    format!(
        "Our moderator team has reviewed [this post]({item_url}) and decided to give you a {ban_type} ban. \
         If you wish to appeal this ban, please respond to this message.\n\n{}",
        bot_disclaimer(contact_url)
    )
}

pub fn permanently_banned(author: &str) -> String {
    format!("/u/{author} permanently banned")
}

pub fn banned_for_days(author: &str, days: u32) -> String {
    format!("/u/{author} banned for {days} day(s)")
}

pub fn item_notice(kind: &str, source: &str, author: &str, url: &str) -> String {
    format!("New {kind} on /r/{source} by /u/{author}!\n\n{url}")
}

pub fn reported_notice(kind: &str, source: &str, author: &str, url: &str) -> String {
    format!("{} reported on /r/{source} by /u/{author}!\n\n{url}", title_case(kind))
}

pub fn modmail_notice(subject: &str, source: &str, author: &str, body: &str) -> String {
    format!("New message in modmail conversation '{subject}' on /r/{source} by /u/{author}!\n\n{body}")
}

pub fn mod_action_notice(actor: &str, source: &str, action: &str) -> String {
    format!("New action taken by /u/{actor} on /r/{source}: `{action}`")
}

pub fn payload_summary(kind: &str, actions: &[&str], user: &str, author: &str, url: &str) -> String {
    let kind = title_case(kind);
    format!(
        "**{kind} {} by {user}!**\n\n{kind} by /u/{author}:\n\n{url}",
        actions.join(" and ")
    )
}

/// Upper-cases the first letter of every word ("mod action" -> "Mod Action").
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
