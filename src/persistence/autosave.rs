// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background autosave worker.
//!
//! The interactive side hands encoded documents to a dedicated thread over
//! a channel and never waits for the write. Deletes travel over the same
//! channel so they are ordered after any queued write.

use crate::error::ScenarioError;
use crate::io::storage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

enum AutosaveCommand {
    Write(String),
    Clear,
    Flush(Sender<()>),
}

/// Handle to the autosave thread for one slot.
pub struct AutosaveWorker {
    path: PathBuf,
    sender: Option<Sender<AutosaveCommand>>,
    failures: Receiver<ScenarioError>,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveWorker {
    /// Start a worker that owns the slot at `path`.
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = channel();
        let (failure_sender, failures) = channel();
        let slot = path.clone();
        let handle = std::thread::Builder::new()
            .name("autosave".to_string())
            .spawn(move || run(&slot, receiver, failure_sender));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start autosave thread: {}", e);
                None
            }
        };

        Self {
            path,
            sender: Some(sender),
            failures,
            handle,
        }
    }

    /// Location of the autosave slot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue `payload` to overwrite the slot.
    pub fn write(&self, payload: String) {
        self.send(AutosaveCommand::Write(payload));
    }

    /// Queue removal of the slot.
    pub fn clear(&self) {
        self.send(AutosaveCommand::Clear);
    }

    /// Block until every command queued so far has been handled.
    pub fn flush(&self) {
        let (ack, done) = channel();
        if self.send(AutosaveCommand::Flush(ack)) {
            let _ = done.recv();
        }
    }

    /// Failures reported by the worker since the last call.
    pub fn take_failures(&self) -> Vec<ScenarioError> {
        self.failures.try_iter().collect()
    }

    fn send(&self, command: AutosaveCommand) -> bool {
        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(command).is_ok());
        if !sent {
            log::warn!("Autosave thread is not running, dropping command");
        }
        sent
    }
}

impl Drop for AutosaveWorker {
    fn drop(&mut self) {
        // Closing the channel lets the thread drain its queue and exit.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Autosave thread panicked");
            }
        }
    }
}

fn run(slot: &Path, receiver: Receiver<AutosaveCommand>, failures: Sender<ScenarioError>) {
    let mut pending = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match receiver.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            AutosaveCommand::Write(mut payload) => {
                // Only the newest of several queued writes matters.
                while let Ok(next) = receiver.try_recv() {
                    match next {
                        AutosaveCommand::Write(newer) => payload = newer,
                        other => {
                            pending = Some(other);
                            break;
                        }
                    }
                }
                match storage::write_atomic(slot, payload.as_bytes()) {
                    Ok(()) => log::debug!("Autosaved {} bytes to {}", payload.len(), slot.display()),
                    Err(e) => report(&failures, e),
                }
            }
            AutosaveCommand::Clear => match storage::remove_if_exists(slot) {
                Ok(()) => log::debug!("Cleared autosave {}", slot.display()),
                Err(e) => report(&failures, e),
            },
            AutosaveCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn report(failures: &Sender<ScenarioError>, error: ScenarioError) {
    log::warn!("Autosave failed: {}", error);
    let _ = failures.send(error);
}
