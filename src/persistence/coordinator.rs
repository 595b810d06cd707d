// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Save, load and exit coordination for one editing session.
//!
//! The coordinator tracks whether the document has unsaved changes,
//! mirrors every change into the autosave slot, and decides whether the
//! application may close.
//!
//! ```text
//! Clean --mutation--> Dirty --save--> Clean
//! Dirty --exit requested--> AwaitingExitDecision
//! AwaitingExitDecision --save-then-exit--> Clean, then Terminated
//! AwaitingExitDecision --discard-and-exit--> Terminated
//! AwaitingExitDecision --cancel-exit / cancelled save--> Dirty
//! ```

use super::autosave::AutosaveWorker;
use super::prompt::FilePrompt;
use crate::error::{Result, ScenarioError};
use crate::io::serialization::{self, FormatError, FILE_EXTENSION};
use crate::io::storage;
use crate::models::project::Document;
use std::path::{Path, PathBuf};

/// File name offered when the document has never been saved.
pub const SUGGESTED_FILE_NAME: &str = "scenario.scen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Clean,
    Dirty,
    AwaitingExitDecision,
    Terminated,
}

/// Result of an explicit save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Cancelled,
}

/// Answer to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCheck {
    /// Nothing to lose, close now.
    Proceed,
    /// Ask the user for an [`ExitDecision`] first.
    ConfirmationRequired,
}

/// The user's answer to the exit confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    SaveThenExit,
    DiscardAndExit,
    CancelExit,
}

/// What the application should do once an exit decision is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitResolution {
    Close,
    StayOpen,
}

pub struct PersistenceCoordinator {
    state: SessionState,
    autosave: AutosaveWorker,
    current_path: Option<PathBuf>,
}

impl PersistenceCoordinator {
    pub fn new(autosave: AutosaveWorker) -> Self {
        Self {
            state: SessionState::Clean,
            autosave,
            current_path: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        matches!(
            self.state,
            SessionState::Dirty | SessionState::AwaitingExitDecision
        )
    }

    /// File the document was last saved to or loaded from.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn autosave_path(&self) -> &Path {
        self.autosave.path()
    }

    /// Autosave failures since the last call, for display.
    pub fn take_autosave_failures(&self) -> Vec<ScenarioError> {
        self.autosave.take_failures()
    }

    /// Record a mutation and mirror the document into the autosave slot.
    ///
    /// Never fails: encoding and write problems are logged and reported
    /// through [`take_autosave_failures`](Self::take_autosave_failures).
    pub fn notify_changed(&mut self, document: &Document) {
        if self.state == SessionState::Clean {
            self.state = SessionState::Dirty;
        }
        match serialization::encode(document) {
            Ok(payload) => self.autosave.write(payload),
            Err(e) => log::error!("Failed to encode document for autosave: {}", e),
        }
    }

    /// Ask for a destination and save `document` there.
    ///
    /// Cancelling the prompt or failing the write leaves the session dirty.
    pub fn save(&mut self, document: &Document, prompt: &dyn FilePrompt) -> Result<SaveOutcome> {
        let Some(path) = prompt.save_destination(&self.suggested_file_name()) else {
            log::info!("Save cancelled");
            return Ok(SaveOutcome::Cancelled);
        };
        let path = with_scenario_extension(path);

        let payload = serialization::encode(document)?;
        if let Err(e) = storage::write_atomic(&path, payload.as_bytes()) {
            log::error!("Failed to save scenario: {}", e);
            return Err(e);
        }

        self.autosave.clear();
        if self.state != SessionState::Terminated {
            self.state = SessionState::Clean;
        }
        log::info!("Saved {} notes to {}", document.notes.len(), path.display());
        self.current_path = Some(path.clone());
        Ok(SaveOutcome::Saved(path))
    }

    /// Decode raw scenario text. Session state is not touched.
    pub fn load(&self, raw: &str) -> Result<Document, FormatError> {
        serialization::decode(raw)
    }

    /// Read and decode the file at `path`.
    ///
    /// On success the session is clean and remembers `path`; on failure
    /// nothing changes.
    pub fn load_file(&mut self, path: &Path) -> Result<Document> {
        let raw = storage::read_text(path)?;
        let document = self.load(&raw).inspect_err(|e| {
            log::error!("Rejected {}: {}", path.display(), e);
        })?;
        log::info!("Loaded {} notes from {}", document.notes.len(), path.display());
        self.current_path = Some(path.to_path_buf());
        self.state = SessionState::Clean;
        Ok(document)
    }

    /// Whether the autosave slot currently holds a document.
    pub fn has_autosave(&self) -> bool {
        self.autosave.flush();
        self.autosave.path().is_file()
    }

    /// Decode the autosave slot, if present.
    ///
    /// The recovered document was never saved by the user, so the session
    /// becomes dirty.
    pub fn recover_autosave(&mut self) -> Result<Option<Document>> {
        if !self.has_autosave() {
            return Ok(None);
        }
        let raw = storage::read_text(self.autosave.path())?;
        let document = self.load(&raw)?;
        log::info!("Recovered {} notes from autosave", document.notes.len());
        self.current_path = None;
        self.state = SessionState::Dirty;
        Ok(Some(document))
    }

    /// Mark the in-memory document as matching nothing on disk yet, without
    /// unsaved work.
    pub fn start_fresh(&mut self) {
        self.current_path = None;
        self.state = SessionState::Clean;
    }

    /// Handle a request to close the application.
    pub fn request_exit(&mut self) -> ExitCheck {
        match self.state {
            SessionState::Clean | SessionState::Terminated => {
                self.terminate();
                ExitCheck::Proceed
            }
            SessionState::Dirty | SessionState::AwaitingExitDecision => {
                self.state = SessionState::AwaitingExitDecision;
                ExitCheck::ConfirmationRequired
            }
        }
    }

    /// Apply the user's answer to the exit confirmation.
    ///
    /// A save that is cancelled or fails returns the session to dirty and
    /// keeps the application open; a failure is also returned as an error.
    pub fn resolve_exit(
        &mut self,
        decision: ExitDecision,
        document: &Document,
        prompt: &dyn FilePrompt,
    ) -> Result<ExitResolution> {
        log::info!("Exit decision: {:?}", decision);
        match decision {
            ExitDecision::SaveThenExit => match self.save(document, prompt) {
                Ok(SaveOutcome::Saved(_)) => {
                    self.terminate();
                    Ok(ExitResolution::Close)
                }
                Ok(SaveOutcome::Cancelled) => {
                    self.state = SessionState::Dirty;
                    Ok(ExitResolution::StayOpen)
                }
                Err(e) => {
                    self.state = SessionState::Dirty;
                    Err(e)
                }
            },
            ExitDecision::DiscardAndExit => {
                // The slot keeps the unsaved work for the next launch.
                self.terminate();
                Ok(ExitResolution::Close)
            }
            ExitDecision::CancelExit => {
                self.state = SessionState::Dirty;
                Ok(ExitResolution::StayOpen)
            }
        }
    }

    fn terminate(&mut self) {
        self.autosave.flush();
        self.state = SessionState::Terminated;
    }

    fn suggested_file_name(&self) -> String {
        self.current_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| SUGGESTED_FILE_NAME.to_string())
    }
}

fn with_scenario_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(FILE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::{NotePatch, Point};
    use crate::models::store::DocumentStore;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Prompt that answers from a script instead of showing dialogs.
    #[derive(Default)]
    struct ScriptedPrompt {
        save_to: Option<PathBuf>,
        open: Option<PathBuf>,
        suggestions: RefCell<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn saving_to(path: PathBuf) -> Self {
            Self {
                save_to: Some(path),
                ..Default::default()
            }
        }

        fn cancelling() -> Self {
            Self::default()
        }
    }

    impl FilePrompt for ScriptedPrompt {
        fn save_destination(&self, suggested_name: &str) -> Option<PathBuf> {
            self.suggestions.borrow_mut().push(suggested_name.to_string());
            self.save_to.clone()
        }

        fn open_source(&self) -> Option<PathBuf> {
            self.open.clone()
        }
    }

    struct Fixture {
        dir: TempDir,
        coordinator: PersistenceCoordinator,
        store: DocumentStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let worker = AutosaveWorker::spawn(dir.path().join("data").join("autosave.scen"));
            Self {
                dir,
                coordinator: PersistenceCoordinator::new(worker),
                store: DocumentStore::new(),
            }
        }

        fn mutate(&mut self) {
            self.store.create_note(Point::new(1.0, 2.0));
            self.coordinator.notify_changed(&self.store.serialize());
        }

        fn autosave_exists(&self) -> bool {
            self.coordinator.has_autosave()
        }
    }

    #[test]
    fn test_starts_clean_and_mutation_makes_dirty() {
        let mut fx = Fixture::new();
        assert_eq!(fx.coordinator.state(), SessionState::Clean);
        fx.mutate();
        assert!(fx.coordinator.is_dirty());
    }

    #[test]
    fn test_mutation_writes_autosave() {
        let mut fx = Fixture::new();
        fx.mutate();
        assert!(fx.autosave_exists());

        let raw = storage::read_text(fx.coordinator.autosave_path()).unwrap();
        let document = serialization::decode(&raw).unwrap();
        assert_eq!(document, fx.store.serialize());
    }

    #[test]
    fn test_save_cleans_and_removes_autosave() {
        let mut fx = Fixture::new();
        fx.mutate();
        let target = fx.dir.path().join("story.scen");
        let prompt = ScriptedPrompt::saving_to(target.clone());

        let outcome = fx.coordinator.save(&fx.store.serialize(), &prompt).unwrap();

        assert_eq!(outcome, SaveOutcome::Saved(target.clone()));
        assert_eq!(fx.coordinator.state(), SessionState::Clean);
        assert!(!fx.autosave_exists());
        assert_eq!(prompt.suggestions.borrow()[0], SUGGESTED_FILE_NAME);

        let saved = serialization::decode(&storage::read_text(&target).unwrap()).unwrap();
        assert_eq!(saved, fx.store.serialize());
    }

    #[test]
    fn test_save_appends_extension_and_remembers_name() {
        let mut fx = Fixture::new();
        fx.mutate();
        let prompt = ScriptedPrompt::saving_to(fx.dir.path().join("draft"));
        let outcome = fx.coordinator.save(&fx.store.serialize(), &prompt).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(fx.dir.path().join("draft.scen")));

        fx.mutate();
        fx.coordinator.save(&fx.store.serialize(), &prompt).unwrap();
        assert_eq!(prompt.suggestions.borrow()[1], "draft.scen");
    }

    #[test]
    fn test_cancelled_save_stays_dirty() {
        let mut fx = Fixture::new();
        fx.mutate();
        let outcome = fx
            .coordinator
            .save(&fx.store.serialize(), &ScriptedPrompt::cancelling())
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Cancelled);
        assert!(fx.coordinator.is_dirty());
        assert!(fx.autosave_exists());
    }

    #[test]
    fn test_failed_save_stays_dirty() {
        let mut fx = Fixture::new();
        fx.mutate();
        let blocker = fx.dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let prompt = ScriptedPrompt::saving_to(blocker.join("story.scen"));

        let result = fx.coordinator.save(&fx.store.serialize(), &prompt);
        assert!(matches!(result, Err(ScenarioError::FileIo { .. })));
        assert!(fx.coordinator.is_dirty());
    }

    #[test]
    fn test_load_rejects_bad_prefix_without_touching_state() {
        let mut fx = Fixture::new();
        fx.mutate();
        let before = fx.store.serialize();

        let path = fx.dir.path().join("bad.scen");
        std::fs::write(&path, "BADPREFIX...").unwrap();
        let result = fx.coordinator.load_file(&path);

        assert!(matches!(
            result,
            Err(ScenarioError::Format(FormatError::MissingTag))
        ));
        assert_eq!(fx.store.serialize(), before);
        assert!(fx.coordinator.is_dirty());
        assert!(fx.coordinator.current_path().is_none());
    }

    #[test]
    fn test_load_rejects_ids_without_headroom() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let mut fx = Fixture::new();
        let json = r#"{"notes":[{"id":1,"x":0,"y":0,"width":200,"height":150},{"id":18446744073709551615,"x":0,"y":0,"width":200,"height":150}]}"#;
        let path = fx.dir.path().join("huge.scen");
        std::fs::write(&path, format!("{}{}", serialization::FORMAT_TAG, STANDARD.encode(json)))
            .unwrap();

        let result = fx.coordinator.load_file(&path);
        assert!(matches!(
            result,
            Err(ScenarioError::Format(FormatError::Ids(_)))
        ));
        assert!(fx.coordinator.current_path().is_none());
        assert_eq!(fx.coordinator.state(), SessionState::Clean);
    }

    #[test]
    fn test_load_file_roundtrip() {
        let mut fx = Fixture::new();
        let mut source = DocumentStore::with_sample_notes();
        source.update_note(2, NotePatch::important(true));
        let path = fx.dir.path().join("sample.scen");
        storage::write_atomic(&path, serialization::encode(&source.serialize()).unwrap().as_bytes())
            .unwrap();

        let document = fx.coordinator.load_file(&path).unwrap();
        fx.store.replace(document).unwrap();

        assert_eq!(fx.store.serialize(), source.serialize());
        assert_eq!(fx.coordinator.state(), SessionState::Clean);
        assert_eq!(fx.coordinator.current_path(), Some(path.as_path()));
    }

    #[test]
    fn test_exit_when_clean_proceeds() {
        let mut fx = Fixture::new();
        assert_eq!(fx.coordinator.request_exit(), ExitCheck::Proceed);
        assert_eq!(fx.coordinator.state(), SessionState::Terminated);
    }

    #[test]
    fn test_exit_cancel_keeps_dirty() {
        let mut fx = Fixture::new();
        fx.mutate();
        assert_eq!(
            fx.coordinator.request_exit(),
            ExitCheck::ConfirmationRequired
        );
        assert_eq!(fx.coordinator.state(), SessionState::AwaitingExitDecision);

        let resolution = fx
            .coordinator
            .resolve_exit(
                ExitDecision::CancelExit,
                &fx.store.serialize(),
                &ScriptedPrompt::cancelling(),
            )
            .unwrap();
        assert_eq!(resolution, ExitResolution::StayOpen);
        assert_eq!(fx.coordinator.state(), SessionState::Dirty);
    }

    #[test]
    fn test_exit_discard_keeps_autosave() {
        let mut fx = Fixture::new();
        fx.mutate();
        fx.coordinator.request_exit();
        let resolution = fx
            .coordinator
            .resolve_exit(
                ExitDecision::DiscardAndExit,
                &fx.store.serialize(),
                &ScriptedPrompt::cancelling(),
            )
            .unwrap();

        assert_eq!(resolution, ExitResolution::Close);
        assert_eq!(fx.coordinator.state(), SessionState::Terminated);
        assert!(fx.autosave_exists());
    }

    #[test]
    fn test_exit_save_cancelled_reverts_to_dirty() {
        let mut fx = Fixture::new();
        fx.mutate();
        fx.coordinator.request_exit();
        let resolution = fx
            .coordinator
            .resolve_exit(
                ExitDecision::SaveThenExit,
                &fx.store.serialize(),
                &ScriptedPrompt::cancelling(),
            )
            .unwrap();

        assert_eq!(resolution, ExitResolution::StayOpen);
        assert_eq!(fx.coordinator.state(), SessionState::Dirty);
        assert!(fx.autosave_exists());
    }

    #[test]
    fn test_exit_save_then_close() {
        let mut fx = Fixture::new();
        fx.mutate();
        fx.coordinator.request_exit();
        let prompt = ScriptedPrompt::saving_to(fx.dir.path().join("final.scen"));
        let resolution = fx
            .coordinator
            .resolve_exit(ExitDecision::SaveThenExit, &fx.store.serialize(), &prompt)
            .unwrap();

        assert_eq!(resolution, ExitResolution::Close);
        assert_eq!(fx.coordinator.state(), SessionState::Terminated);
        assert!(!fx.autosave_exists());
        assert!(fx.dir.path().join("final.scen").is_file());
    }

    #[test]
    fn test_recover_autosave() {
        let mut fx = Fixture::new();
        assert!(fx.coordinator.recover_autosave().unwrap().is_none());

        fx.mutate();
        fx.mutate();
        let expected = fx.store.serialize();
        assert!(fx.autosave_exists());

        // A fresh session over the same slot sees the unsaved work
        let worker = AutosaveWorker::spawn(fx.coordinator.autosave_path().to_path_buf());
        let mut next = PersistenceCoordinator::new(worker);
        let recovered = next.recover_autosave().unwrap().unwrap();
        assert_eq!(recovered, expected);
        assert!(next.is_dirty());
    }
}
