//! Application wiring and command handlers

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use config::{AppConfig, Backend};
use log::{info, warn};
use messages::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, MessageId, MessageThreadStore,
    Persistence, SqliteKeyValueStore, list_conversations, search_inbound,
};
use vision::{AnnotateRequest, AuthContext, VisionClient, annotate_image, handle_callable};

use crate::views::inbox::{render_conversations, render_inbound};
use crate::views::thread::render_message;
use crate::views::{ChatView, InboxView};

/// The one store instance for this process
pub type SharedStore = Arc<MessageThreadStore>;

pub struct LostFoundApp {
    config: AppConfig,
    store: SharedStore,
}

impl LostFoundApp {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::load()?,
        };
        let substrate = open_substrate(&config)?;
        let store = Arc::new(MessageThreadStore::open(substrate));
        Ok(Self { config, store })
    }

    pub fn show_inbox(&self) -> Result<()> {
        println!("{}", render_inbound(&self.store.get_all()));
        Ok(())
    }

    pub fn search(&self, text: &str) -> Result<()> {
        println!("{}", render_inbound(&search_inbound(&self.store, text)));
        Ok(())
    }

    pub fn show_conversations(&self) -> Result<()> {
        println!("{}", render_conversations(&list_conversations(&self.store)));
        Ok(())
    }

    pub fn show_thread(&self, email: &str) -> Result<()> {
        println!("{}", ChatView::open(&self.store, email).render());
        Ok(())
    }

    pub fn reply(&self, email: &str, body: &str) -> Result<()> {
        let body = require_body(body)?;
        let view = ChatView::open(&self.store, email);
        let sent = self.store.send_as_admin(email, body);
        report(&sent.persistence);
        info!("{} messages with {}", view.len(), email);
        println!("{}", view.render());
        Ok(())
    }

    pub fn send_as_participant(&self, email: &str, name: &str, body: &str) -> Result<()> {
        let body = require_body(body)?;
        let sent = self.store.send_as_participant(email, name.trim(), body);
        report(&sent.persistence);
        println!("{}", render_message(&sent.message));
        Ok(())
    }

    pub fn contact(&self, name: &str, email: &str, subject: &str, body: &str) -> Result<()> {
        let body = require_body(body)?;
        let sent = self.store.receive(name.trim(), email.trim(), subject.trim(), body);
        report(&sent.persistence);
        println!("Recorded message {}", sent.message.id);
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let id = MessageId::new(id);
        let existed = self.store.get_all().iter().any(|m| m.id == id);
        let view = InboxView::new(&self.store);

        report(&self.store.remove(id));
        if !existed {
            warn!("No inbound message with id {}", id);
        }
        info!("Delete notifications delivered: {:?}", view.removed_ids());
        Ok(())
    }

    pub fn annotate(&self, image: &Path, uid: Option<&str>, raw: bool) -> Result<()> {
        let bytes = std::fs::read(image)
            .with_context(|| format!("Failed to read image: {}", image.display()))?;
        let api_key = self.config.vision_api_key.clone().with_context(|| {
            format!(
                "No vision API key configured (set vision_api_key in {} or {})",
                config::APP_CONFIG_FILE,
                config::VISION_API_KEY_ENV
            )
        })?;

        let mut client = VisionClient::new(api_key);
        if let Some(endpoint) = &self.config.vision_endpoint {
            client = client.with_endpoint(endpoint.clone());
        }

        let request = AnnotateRequest::new(STANDARD.encode(&bytes));
        let auth = uid.map(AuthContext::new);

        if raw {
            let body = serde_json::json!({ "data": request }).to_string();
            let response = handle_callable(&body, auth.as_ref(), &client);
            println!("{}", serde_json::to_string_pretty(&response.body)?);
            return Ok(());
        }

        match annotate_image(&request, auth.as_ref(), &client) {
            Ok(annotations) => {
                println!("Labels:  {}", annotations.label_names(0.5).join(", "));
                let objects: Vec<&str> = annotations.objects.iter().map(|o| o.name.as_str()).collect();
                println!("Objects: {}", objects.join(", "));
                if let Some(color) = annotations.dominant_color() {
                    println!("Color:   {}", color.hex());
                }
                if annotations.safe_search.is_some_and(|s| s.is_flagged()) {
                    println!("Flagged by safe search; do not publish.");
                }
                Ok(())
            }
            Err(e) => bail!("{} ({})", e, e.code()),
        }
    }
}

fn open_substrate(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    let dir = match config.backend {
        Backend::Memory => {
            info!("Using in-memory store; nothing will be saved");
            return Ok(Arc::new(InMemoryKeyValueStore::new()));
        }
        Backend::Sqlite | Backend::File => config.resolved_data_dir()?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    info!("Message store at {}", dir.display());

    if config.backend == Backend::File {
        Ok(Arc::new(FileKeyValueStore::new(dir.join("store"))?))
    } else {
        Ok(Arc::new(SqliteKeyValueStore::new(dir.join("messages.sqlite"))?))
    }
}

/// The store accepts empty bodies; the tool does not
fn require_body(body: &str) -> Result<&str> {
    let body = body.trim();
    if body.is_empty() {
        bail!("Message body must not be empty");
    }
    Ok(body)
}

fn report(persistence: &Persistence) {
    if let Persistence::Failed { key, reason } = persistence {
        eprintln!("Warning: change kept for this run only; saving {} failed: {}", key, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_body() {
        assert_eq!(require_body("  hi \n").unwrap(), "hi");
        assert!(require_body(" \n ").is_err());
    }

    #[test]
    fn test_memory_backend_starts_seeded() {
        let config = AppConfig {
            backend: Backend::Memory,
            ..Default::default()
        };
        let store = MessageThreadStore::open(open_substrate(&config).unwrap());
        assert_eq!(store.get_all().len(), 2);
    }

    #[test]
    fn test_file_backend_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            backend: Backend::File,
            data_dir: Some(dir.path().join("data")),
            ..Default::default()
        };

        let store = MessageThreadStore::open(open_substrate(&config).unwrap());
        store.send_as_admin("john@example.com", "Saved?");
        drop(store);

        let reopened = MessageThreadStore::open(open_substrate(&config).unwrap());
        assert_eq!(reopened.get_thread("john@example.com").len(), 3);
        assert!(dir.path().join("data/store").is_dir());
    }
}
