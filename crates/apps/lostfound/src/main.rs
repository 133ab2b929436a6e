//! Lost & Found - admin tool for the inbox, conversations and photo labeling
//!
//! This binary is the composition root: it loads config, installs logging,
//! builds exactly one message store and hands it to the views.

use anyhow::Result;
use clap::Parser;
use log::error;

mod app;
mod cli;
mod views;

use app::LostFoundApp;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let app = LostFoundApp::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Inbox => app.show_inbox(),
        Commands::Search { text } => app.search(&text),
        Commands::Conversations => app.show_conversations(),
        Commands::Thread { email } => app.show_thread(&email),
        Commands::Reply { email, body } => app.reply(&email, &body),
        Commands::Send { email, name, body } => app.send_as_participant(&email, &name, &body),
        Commands::Contact {
            name,
            email,
            subject,
            body,
        } => app.contact(&name, &email, &subject, &body),
        Commands::Delete { id } => app.delete(id),
        Commands::Annotate {
            image,
            uid,
            anonymous,
            raw,
        } => {
            let uid = (!anonymous).then_some(uid.as_str());
            app.annotate(&image, uid, raw)
        }
    }
}
