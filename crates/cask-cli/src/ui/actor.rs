//! UI Actor - Single-threaded event processing
//!
//! Download tasks and the lifecycle executor fire events from any task; one
//! dedicated thread owns stdout and renders them in order. A download's
//! progress is redrawn in place on a single line, which is closed before any
//! other event is printed.

use std::io::{Write, stdout};
use std::sync::mpsc;
use std::thread;

use cask_core::types::{PackageName, Version};
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use super::theme::{Theme, format_download_progress};

/// Events that can be sent to the UI actor
#[derive(Debug)]
pub enum UiEvent {
    /// Print a section header
    Section { title: String },
    /// Redraw the progress line of a download
    Downloading {
        name: PackageName,
        version: Version,
        current: u64,
        total: Option<u64>,
    },
    /// A cask entered a new phase (verifying, installing, removing ...)
    Status { name: PackageName, status: String },
    /// Mark a cask as successfully done
    Done {
        name: PackageName,
        version: Version,
        detail: String,
    },
    /// Mark a cask as failed
    Failed {
        name: PackageName,
        version: Version,
        reason: String,
    },
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    /// Synchronize (all earlier events have been rendered)
    Sync(tokio::sync::oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the UI actor thread
#[derive(Debug)]
pub struct UiActor {
    sender: mpsc::Sender<UiEvent>,
    _handle: thread::JoinHandle<()>,
}

impl UiActor {
    /// Spawn a new UI actor thread
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || run_event_loop(&receiver));
        Self {
            sender,
            _handle: handle,
        }
    }

    /// Get a cloneable sender for this actor
    pub fn sender(&self) -> mpsc::Sender<UiEvent> {
        self.sender.clone()
    }
}

impl Drop for UiActor {
    fn drop(&mut self) {
        let _ = self.sender.send(UiEvent::Shutdown);
    }
}

/// Renders events; owns the "progress line is open" flag.
struct Renderer {
    theme: Theme,
    live: bool,
}

impl Renderer {
    fn close_live(&mut self) {
        if self.live {
            println!();
            self.live = false;
        }
    }

    fn progress(&mut self, name: &PackageName, version: &Version, current: u64, total: Option<u64>) {
        let line = format!(
            "  {} {} {} {}",
            self.theme.icons.active.with(self.theme.colors.active),
            name.as_str().with(self.theme.colors.package_name),
            version.as_str().with(self.theme.colors.version),
            format_download_progress(current, total).with(self.theme.colors.secondary),
        );
        let mut out = stdout();
        let _ = out.queue(MoveToColumn(0));
        let _ = out.queue(Clear(ClearType::CurrentLine));
        let _ = write!(out, "{line}");
        let _ = out.flush();
        self.live = true;
    }

    fn render(&mut self, event: UiEvent) {
        let theme = self.theme.clone();
        if !matches!(event, UiEvent::Downloading { .. } | UiEvent::Sync(_)) {
            self.close_live();
        }
        match event {
            UiEvent::Section { title } => {
                println!();
                println!("{}", title.bold());
            }
            UiEvent::Downloading {
                name,
                version,
                current,
                total,
            } => self.progress(&name, &version, current, total),
            UiEvent::Status { name, status } => {
                println!(
                    "  {} {} {}",
                    theme.icons.active.with(theme.colors.active),
                    name.as_str().with(theme.colors.package_name),
                    status.with(theme.colors.secondary)
                );
            }
            UiEvent::Done {
                name,
                version,
                detail,
            } => {
                println!(
                    "  {} {} {} {}",
                    theme.icons.success.with(theme.colors.success),
                    name.as_str().with(theme.colors.package_name),
                    version.as_str().with(theme.colors.version),
                    detail.with(theme.colors.success)
                );
            }
            UiEvent::Failed {
                name,
                version,
                reason,
            } => {
                println!(
                    "  {} {} {} {}",
                    theme.icons.error.with(theme.colors.error),
                    name.as_str().with(theme.colors.package_name),
                    version.as_str().with(theme.colors.version),
                    format!("FAILED: {reason}").with(theme.colors.error)
                );
            }
            UiEvent::Info(msg) => println!("  {} {msg}", theme.icons.info),
            UiEvent::Success(msg) => {
                println!("{} {}", theme.icons.success.green(), msg.green());
            }
            UiEvent::Warning(msg) => {
                println!("{} {}", theme.icons.warning.yellow(), msg.yellow());
            }
            UiEvent::Error(msg) => {
                println!("{} {}", theme.icons.error.red(), msg.red());
            }
            UiEvent::Sync(tx) => {
                let _ = stdout().flush();
                let _ = tx.send(());
            }
            UiEvent::Shutdown => {}
        }
    }
}

/// Main event loop for the UI actor
fn run_event_loop(receiver: &mpsc::Receiver<UiEvent>) {
    let mut renderer = Renderer {
        theme: Theme::default(),
        live: false,
    };
    while let Ok(event) = receiver.recv() {
        if matches!(event, UiEvent::Shutdown) {
            break;
        }
        renderer.render(event);
    }
    renderer.close_live();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_round_trip() {
        let actor = UiActor::spawn();
        let sender = actor.sender();

        sender.send(UiEvent::Info("test".to_string())).unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        sender.send(UiEvent::Sync(tx)).unwrap();
        rx.blocking_recv().unwrap();

        drop(actor);
    }

    #[test]
    fn test_progress_line_is_closed_by_next_event() {
        let mut renderer = Renderer {
            theme: Theme::default(),
            live: false,
        };
        renderer.render(UiEvent::Downloading {
            name: PackageName::new("opencloud"),
            version: Version::from("1.0.0"),
            current: 10,
            total: Some(100),
        });
        assert!(renderer.live);
        renderer.render(UiEvent::Info("done".to_string()));
        assert!(!renderer.live);
    }
}
