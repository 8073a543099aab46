use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use lexibot::chat::{Conversation, Transport};
use lexibot::cli::{Cli, Commands};
use lexibot::core::{config, init_logger};
use lexibot::i18n;
use lexibot::session::SessionManager;
use lexibot::storage::{create_pool, SqliteStore, WordStore};
use lexibot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramTransport};
use lexibot::translate::{MyMemoryTranslator, Translator};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Users { verbose }) => run_list_users(verbose),
        Some(Commands::Run) | None => run_bot().await,
    }
}

fn open_store() -> Result<Arc<dyn WordStore>> {
    let pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    Ok(Arc::new(SqliteStore::new(pool)))
}

/// Prints every stored user with word count and sender status
fn run_list_users(verbose: bool) -> Result<()> {
    let store = open_store()?;
    let users = store.load_all_users()?;

    println!("{:>14}  {:>5}  {:>9}  sender", "chat_id", "words", "delay_min");
    for user in &users {
        println!(
            "{:>14}  {:>5}  {:>9}  {}",
            user.chat_id,
            user.words.len(),
            user.delay_minutes,
            if user.sender_active { "on" } else { "off" }
        );
        if verbose {
            for entry in &user.words {
                println!(
                    "{:>16} {} - {} ({}x)",
                    "",
                    entry.word,
                    entry.translations.join("/"),
                    entry.usage_count
                );
            }
        }
    }
    println!("{} user(s)", users.len());
    Ok(())
}

/// Runs the bot until Ctrl-C, then stops every word sender
async fn run_bot() -> Result<()> {
    log::info!("Starting lexibot");

    let store = open_store()?;
    let sessions = Arc::new(SessionManager::load(store)?);

    let bot = create_bot()?;
    let lang = i18n::bot_lang();
    if let Err(e) = setup_bot_commands(&bot, &lang).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
    let translator: Arc<dyn Translator> = Arc::new(MyMemoryTranslator::from_env()?);
    let conversation = Conversation::new(sessions, transport, translator, lang);

    conversation.sender().restore_all(conversation.sessions()).await;

    let handler = schema(HandlerDeps::new(conversation.clone()));
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    log::info!("Dispatcher started");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher stopped, shutting down");
    conversation.shutdown().await;
    Ok(())
}
