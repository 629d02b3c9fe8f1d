//! Unified UI output interface.
//!
//! The main API commands use to talk to the terminal. Every call becomes an
//! event for the UI actor.

use std::sync::{OnceLock, mpsc};

use cask_core::Reporter;
use cask_core::types::{PackageName, Version};

use super::actor::{UiActor, UiEvent};

/// Singleton instance of the UI actor channel.
static UI_ACTOR: OnceLock<mpsc::Sender<UiEvent>> = OnceLock::new();

fn actor_sender() -> mpsc::Sender<UiEvent> {
    UI_ACTOR
        .get_or_init(|| {
            let actor = UiActor::spawn();
            let sender = actor.sender();
            // Keep the actor alive for the whole process.
            std::mem::forget(actor);
            sender
        })
        .clone()
}

/// A cloneable handle for sending UI events to the terminal actor.
///
/// In quiet mode progress, sections and informational messages are dropped;
/// results, warnings and errors are always shown.
#[derive(Debug, Clone)]
pub struct Output {
    sender: mpsc::Sender<UiEvent>,
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self {
            sender: actor_sender(),
            quiet,
        }
    }

    fn send(&self, event: UiEvent) {
        let _ = self.sender.send(event);
    }

    fn chatty(&self, event: UiEvent) {
        if !self.quiet {
            self.send(event);
        }
    }

    fn status(&self, name: &PackageName, status: String) {
        self.chatty(UiEvent::Status {
            name: name.clone(),
            status,
        });
    }

    /// Wait until every event sent so far has been rendered.
    pub async fn flush(&self) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send(UiEvent::Sync(tx));
        let _ = rx.await;
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        self.chatty(UiEvent::Section {
            title: title.to_string(),
        });
    }

    fn downloading(&self, name: &PackageName, version: &Version, current: u64, total: Option<u64>) {
        self.chatty(UiEvent::Downloading {
            name: name.clone(),
            version: version.clone(),
            current,
            total,
        });
    }

    fn verifying(&self, name: &PackageName, _version: &Version) {
        self.status(name, "verifying...".to_string());
    }

    fn installing(&self, name: &PackageName, _version: &Version) {
        self.status(name, "installing...".to_string());
    }

    fn removing(&self, name: &PackageName, target: &str) {
        self.status(name, format!("removing {target}"));
    }

    fn done(&self, name: &PackageName, version: &Version, detail: &str, _size: Option<u64>) {
        self.send(UiEvent::Done {
            name: name.clone(),
            version: version.clone(),
            detail: detail.to_string(),
        });
    }

    fn failed(&self, name: &PackageName, version: &Version, reason: &str) {
        self.send(UiEvent::Failed {
            name: name.clone(),
            version: version.clone(),
            reason: reason.to_string(),
        });
    }

    fn info(&self, msg: &str) {
        self.chatty(UiEvent::Info(msg.to_string()));
    }

    fn success(&self, msg: &str) {
        self.send(UiEvent::Success(msg.to_string()));
    }

    fn warning(&self, msg: &str) {
        self.send(UiEvent::Warning(msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.send(UiEvent::Error(msg.to_string()));
    }
}
