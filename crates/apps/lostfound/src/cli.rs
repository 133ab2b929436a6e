use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lostfound", version, about = "Lost & Found front office: inbox, conversations and image annotation")]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/lostfound/lostfound.json
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List inbound messages
    Inbox,

    /// Search inbound messages by sender, address, subject or body
    Search {
        text: String,
    },

    /// List conversations, most recent first
    Conversations,

    /// Show the conversation with a participant
    Thread {
        email: String,
    },

    /// Reply to a participant as staff
    Reply {
        email: String,
        body: String,
    },

    /// Post a message as the participant
    Send {
        email: String,
        name: String,
        body: String,
    },

    /// Record a new inbound message
    Contact {
        name: String,
        email: String,
        subject: String,
        body: String,
    },

    /// Delete an inbound message by id
    Delete {
        id: i64,
    },

    /// Label a photo of a found item
    Annotate {
        /// Image file (JPEG, PNG, ...)
        image: PathBuf,

        /// Caller identity
        #[arg(long, default_value = "local-admin")]
        uid: String,

        /// Call without an identity (the function will refuse)
        #[arg(long)]
        anonymous: bool,

        /// Print the raw callable envelope instead of a summary
        #[arg(long)]
        raw: bool,
    },
}
