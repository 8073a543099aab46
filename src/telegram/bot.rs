//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;
use unic_langid::LanguageIdentifier;

use crate::core::config;
use crate::i18n;
use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show the main menu")]
    Menu,
    #[command(description = "send a word now")]
    Send,
    #[command(description = "show how often each word was sent")]
    Priorities,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid URL
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Localized command list for the Telegram UI.
pub fn bot_commands(lang: &LanguageIdentifier) -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", i18n::t(lang, "command-start")),
        BotCommand::new("menu", i18n::t(lang, "command-menu")),
        BotCommand::new("send", i18n::t(lang, "command-send")),
        BotCommand::new("priorities", i18n::t(lang, "command-priorities")),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot, lang: &LanguageIdentifier) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(bot_commands(lang)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "lexibot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/menu", "lexibot").unwrap(), Command::Menu);
        assert_eq!(Command::parse("/send", "lexibot").unwrap(), Command::Send);
        assert_eq!(Command::parse("/priorities", "lexibot").unwrap(), Command::Priorities);
        assert!(Command::parse("/stop", "lexibot").is_err());
    }

    #[test]
    fn test_bot_commands_match_enum() {
        let en = i18n::lang_from_code("en");
        let commands = bot_commands(&en);
        assert_eq!(commands.len(), 4);
        let listed = Command::descriptions().to_string();
        for c in &commands {
            assert!(listed.contains(&c.command), "{} missing from Command", c.command);
            assert!(!c.description.is_empty());
        }
    }
}
