// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It owns the document store and the persistence
//! coordinator, applies UI actions to the store, and notifies persistence
//! once per frame when anything changed.

use crate::cli::Args;
use crate::error::ScenarioError;
use crate::io::serialization::FormatError;
use crate::io::{media, playback::AudioPlayer, storage};
use crate::models::{
    note::{AttachmentEdit, NoteId, NotePatch, Point, Size},
    store::DocumentStore,
};
use crate::persistence::{
    autosave::AutosaveWorker,
    coordinator::{ExitCheck, ExitResolution, PersistenceCoordinator, SaveOutcome},
    prompt::{FilePrompt, NativeFilePrompt},
};
use crate::ui::{
    canvas,
    dialogs::{self, StartupChoice},
    properties, textures::TextureCache, toolbar,
};
use crate::util::geometry::{self, Viewport, ZOOM_STEP};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Pointer drag in progress on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Drag {
    MoveNotes(Vec<NoteId>),
    Resize {
        id: NoteId,
        start: Size,
        dx: f64,
        dy: f64,
    },
    Pan,
}

/// Ephemeral view state. Never saved with the document.
#[derive(Debug, Default)]
pub struct ViewState {
    pub viewport: Viewport,
    /// Selected notes in the order they were selected.
    pub selection: Vec<NoteId>,
    pub drag: Option<Drag>,
    /// Last pointer position over the canvas, in canvas coordinates.
    pub pointer: Point,
    /// Where the canvas context menu was opened.
    pub context_point: Point,
    pub dark_theme: bool,
}

impl ViewState {
    pub fn is_selected(&self, id: NoteId) -> bool {
        self.selection.contains(&id)
    }

    pub fn select_single(&mut self, id: NoteId) {
        self.selection.clear();
        self.selection.push(id);
    }

    pub fn toggle(&mut self, id: NoteId) {
        match self.selection.iter().position(|&s| s == id) {
            Some(index) => {
                self.selection.remove(index);
            }
            None => self.selection.push(id),
        }
    }

    /// Drop selected ids that no longer exist in `store`.
    pub fn retain_existing(&mut self, store: &DocumentStore) {
        self.selection.retain(|&id| store.contains(id));
    }
}

/// Main application state.
pub struct ScenaristApp {
    store: DocumentStore,
    persistence: PersistenceCoordinator,
    prompt: NativeFilePrompt,
    view: ViewState,
    textures: TextureCache,
    player: AudioPlayer,

    /// Startup chooser is showing
    startup_open: bool,
    /// Autosave slot held a document at launch
    can_recover: bool,
    exit_dialog_open: bool,
    /// Set once closing has been approved
    allow_close: bool,

    /// Document changed this frame
    changed: bool,

    error_message: Option<String>,
    notification: Option<(String, Instant)>,
    window_title: String,
}

impl ScenaristApp {
    /// Create the application, opening `args.file` if one was given.
    pub fn new(args: &Args) -> Self {
        let autosave_path = args
            .autosave
            .clone()
            .unwrap_or_else(storage::default_autosave_path);
        log::info!("Autosave slot: {}", autosave_path.display());

        let persistence = PersistenceCoordinator::new(AutosaveWorker::spawn(autosave_path));
        let can_recover = persistence.has_autosave();

        let mut app = Self {
            store: DocumentStore::new(),
            persistence,
            prompt: NativeFilePrompt,
            view: ViewState::default(),
            textures: TextureCache::new(),
            player: AudioPlayer::new(),
            startup_open: true,
            can_recover,
            exit_dialog_open: false,
            allow_close: false,
            changed: false,
            error_message: None,
            notification: None,
            window_title: String::new(),
        };

        if let Some(path) = &args.file {
            app.open_path(path);
        }
        app
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some((message.into(), Instant::now()));
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Hand the document to persistence if it changed since the last call.
    fn flush_changes(&mut self) {
        if std::mem::take(&mut self.changed) {
            self.persistence.notify_changed(&self.store.serialize());
        }
    }

    /// Load `path` into the store. Leaves everything untouched on failure.
    fn open_path(&mut self, path: &Path) -> bool {
        let loaded = self.persistence.load_file(path).and_then(|document| {
            self.store
                .replace(document)
                .map_err(|e| ScenarioError::from(FormatError::from(e)))
        });
        match loaded {
            Ok(()) => {
                self.player.stop();
                self.view.selection.clear();
                self.view.drag = None;
                self.textures.clear();
                self.startup_open = false;
                self.changed = false;
                let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
                self.notify(format!("Opened {}", name));
                true
            }
            Err(e) => {
                self.error_message = Some(format!("Could not open the file.\n{}", e));
                false
            }
        }
    }

    fn open_with_prompt(&mut self) {
        if let Some(path) = self.prompt.open_source() {
            self.open_path(&path);
        }
    }

    fn save(&mut self) {
        self.flush_changes();
        match self.persistence.save(&self.store.serialize(), &self.prompt) {
            Ok(SaveOutcome::Saved(path)) => self.notify(format!("Saved to {}", path.display())),
            Ok(SaveOutcome::Cancelled) => {}
            Err(e) => self.error_message = Some(format!("Could not save the project.\n{}", e)),
        }
    }

    fn handle_startup_choice(&mut self, choice: StartupChoice) {
        match choice {
            StartupChoice::OpenExisting => self.open_with_prompt(),
            StartupChoice::StartNew => {
                self.store = DocumentStore::with_sample_notes();
                self.persistence.start_fresh();
                self.startup_open = false;
            }
            StartupChoice::RecoverAutosave => match self.persistence.recover_autosave() {
                Ok(Some(document)) => match self.store.replace(document) {
                    Ok(()) => {
                        self.startup_open = false;
                        self.notify("Recovered unsaved work");
                    }
                    Err(e) => {
                        self.can_recover = false;
                        self.error_message =
                            Some(format!("Could not recover unsaved work.\n{}", e));
                    }
                },
                Ok(None) => self.can_recover = false,
                Err(e) => {
                    self.can_recover = false;
                    self.error_message = Some(format!("Could not recover unsaved work.\n{}", e));
                }
            },
        }
    }

    fn create_note_at(&mut self, position: Point) {
        let id = self.store.create_note(position).id;
        self.view.select_single(id);
        self.mark_changed();
    }

    fn delete_selected(&mut self) {
        let mut deleted = false;
        for id in std::mem::take(&mut self.view.selection) {
            deleted |= self.store.delete_note(id);
        }
        if deleted {
            self.forget_detached_media();
            self.mark_changed();
        }
    }

    fn connect_selected(&mut self) {
        if self.view.selection.len() < 2 {
            return;
        }
        let created = self.store.connect_all(&self.view.selection);
        self.notify(format!("Created {} new connections", created));
        if created > 0 {
            self.mark_changed();
        }
    }

    fn disconnect_selected(&mut self) {
        let &[a, b] = self.view.selection.as_slice() else {
            return;
        };
        if self.store.remove_connection_between(a, b) {
            self.notify("Connection removed");
            self.mark_changed();
        } else {
            self.notify("These notes are not connected");
        }
    }

    fn selected_pair_connected(&self) -> bool {
        match self.view.selection.as_slice() {
            &[a, b] => self.store.find_connection(a, b).is_some(),
            _ => false,
        }
    }

    /// Release textures and playback of attachments no note holds anymore.
    fn forget_detached_media(&mut self) {
        self.textures.retain(self.store.notes());
        self.player.retain(self.store.notes());
    }

    fn update_note(&mut self, id: NoteId, patch: NotePatch) {
        let removes_media = patch.attachments.iter().any(|edit| {
            matches!(
                edit,
                AttachmentEdit::RemoveImage(_) | AttachmentEdit::RemoveAudio(_)
            )
        });
        if self.store.update_note(id, patch) {
            if removes_media {
                self.forget_detached_media();
            }
            self.mark_changed();
        }
    }

    fn attach_image(&mut self, id: NoteId) {
        let Some(path) = pick_file("Images", media::IMAGE_EXTENSIONS) else {
            return;
        };
        match media::load_image_attachment(&path) {
            Ok(image) => self.update_note(id, NotePatch::attachment(AttachmentEdit::AddImage(image))),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn attach_audio(&mut self, id: NoteId) {
        let Some(path) = pick_file("Audio", media::AUDIO_EXTENSIONS) else {
            return;
        };
        match media::load_audio_attachment(&path) {
            Ok(audio) => self.update_note(id, NotePatch::attachment(AttachmentEdit::AddAudio(audio))),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn play_audio(&mut self, id: NoteId, index: usize) {
        let Some(clip) = self.store.note(id).and_then(|n| n.audios.get(index)) else {
            return;
        };
        if let Err(e) = self.player.play(clip) {
            let message = format!("Cannot play {}: {}", clip.name, e);
            log::warn!("{}", message);
            self.notify(message);
        }
    }

    /// Attach files dropped onto the window to the note under the pointer.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        let target = geometry::drop_target(self.store.notes(), self.view.pointer, &self.view.selection);
        let Some(id) = target else {
            self.notify("Drop files onto a note to attach them");
            return;
        };

        for file in dropped {
            let Some(path) = file.path else {
                log::warn!("Dropped file {} has no path, skipping", file.name);
                continue;
            };
            match media::load_attachment(&path) {
                Ok(edit) => self.update_note(id, NotePatch::attachment(edit)),
                Err(e) => self.error_message = Some(e.to_string()),
            }
        }
    }

    fn set_zoom(&mut self, zoom: f64) {
        let viewport = &mut self.view.viewport;
        let anchor = viewport.to_screen(self.view.pointer);
        viewport.zoom_around(zoom, anchor);
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.allow_close || !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        self.flush_changes();
        match self.persistence.request_exit() {
            ExitCheck::Proceed => self.allow_close = true,
            ExitCheck::ConfirmationRequired => {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.exit_dialog_open = true;
            }
        }
    }

    fn show_exit_dialog(&mut self, ctx: &egui::Context) {
        let Some(decision) = dialogs::exit_confirmation(ctx) else {
            return;
        };
        self.exit_dialog_open = false;
        let document = self.store.serialize();
        match self.persistence.resolve_exit(decision, &document, &self.prompt) {
            Ok(ExitResolution::Close) => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Ok(ExitResolution::StayOpen) => {}
            Err(e) => self.error_message = Some(format!("Could not save the project.\n{}", e)),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::S)) {
            self.save();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::O)) {
            self.open_with_prompt();
        }

        // Remaining shortcuts would clash with text editing
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(Key::Delete)) {
            self.delete_selected();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::A)) {
            self.view.selection = self.store.notes().iter().map(|n| n.id).collect();
        }
        // Shift variant first: consume_key ignores extra shift
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::L)) {
            self.disconnect_selected();
        } else if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::L)) {
            self.connect_selected();
        }
        if ctx.input(|i| i.key_pressed(Key::Enter) && i.modifiers.is_none()) {
            self.create_note_at(self.view.pointer);
        }
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.view.selection.clear();
        }
    }

    fn apply_canvas_action(&mut self, action: canvas::CanvasAction) {
        match action {
            canvas::CanvasAction::Select { id, additive } => {
                if additive {
                    self.view.toggle(id);
                } else {
                    self.view.select_single(id);
                }
            }
            canvas::CanvasAction::ClearSelection => self.view.selection.clear(),
            canvas::CanvasAction::CreateNote(position) => self.create_note_at(position),
            canvas::CanvasAction::MoveNotes { ids, dx, dy } => {
                for id in ids {
                    if let Some(position) = self.store.note(id).map(|n| n.position()) {
                        let moved = Point::new(position.x + dx, position.y + dy);
                        self.update_note(id, NotePatch::position(moved));
                    }
                }
            }
            canvas::CanvasAction::ResizeNote { id, size } => {
                self.update_note(id, NotePatch::size(size));
            }
            canvas::CanvasAction::None => {}
        }
    }

    fn apply_properties_action(&mut self, action: properties::PropertiesAction) {
        match action {
            properties::PropertiesAction::Update(id, patch) => self.update_note(id, patch),
            properties::PropertiesAction::AttachImage(id) => self.attach_image(id),
            properties::PropertiesAction::AttachAudio(id) => self.attach_audio(id),
            properties::PropertiesAction::PlayAudio { id, index } => self.play_audio(id, index),
            properties::PropertiesAction::StopAudio => self.player.stop(),
            properties::PropertiesAction::Delete(id) => {
                if self.store.delete_note(id) {
                    self.view.retain_existing(&self.store);
                    self.forget_detached_media();
                    self.mark_changed();
                }
            }
            properties::PropertiesAction::None => {}
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open… (Ctrl+O)").clicked() {
                        ui.close_menu();
                        self.open_with_prompt();
                    }
                    if ui.button("Save… (Ctrl+S)").clicked() {
                        ui.close_menu();
                        self.save();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.close_menu();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Select all (Ctrl+A)").clicked() {
                        self.view.selection = self.store.notes().iter().map(|n| n.id).collect();
                        ui.close_menu();
                    }
                    let has_selection = !self.view.selection.is_empty();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete selected"))
                        .clicked()
                    {
                        self.delete_selected();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom in").clicked() {
                        self.set_zoom(self.view.viewport.zoom + ZOOM_STEP);
                        ui.close_menu();
                    }
                    if ui.button("Zoom out").clicked() {
                        self.set_zoom(self.view.viewport.zoom - ZOOM_STEP);
                        ui.close_menu();
                    }
                    if ui.button("Reset zoom").clicked() {
                        self.set_zoom(1.0);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.checkbox(&mut self.view.dark_theme, "Dark theme").changed() {
                        let visuals = if self.view.dark_theme {
                            egui::Visuals::dark()
                        } else {
                            egui::Visuals::light()
                        };
                        ctx.set_visuals(visuals);
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        if self
            .notification
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TIMEOUT)
        {
            self.notification = None;
        }
        if self.notification.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} notes · {} connections",
                    self.store.notes().len(),
                    self.store.connections().count()
                ));
                ui.separator();
                ui.label(format!("Zoom {:.0}%", self.view.viewport.zoom * 100.0));
                ui.separator();
                let state = if self.persistence.is_dirty() {
                    "Unsaved changes"
                } else {
                    "Saved"
                };
                ui.label(state).on_hover_text(format!(
                    "Autosave: {}",
                    self.persistence.autosave_path().display()
                ));
                if let Some((message, _)) = &self.notification {
                    ui.separator();
                    ui.label(egui::RichText::new(message).strong());
                }
            });
        });
    }

    fn update_window_title(&mut self, ctx: &egui::Context) {
        let name = self
            .persistence
            .current_path()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "New scenario".to_string());
        let marker = if self.persistence.is_dirty() { " *" } else { "" };
        let title = format!("Scenarist - {}{}", name, marker);
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }
}

fn pick_file(name: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new().add_filter(name, extensions).pick_file()
}

impl eframe::App for ScenaristApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_close_request(ctx);

        for failure in self.persistence.take_autosave_failures() {
            self.notify(format!("Autosave failed: {}", failure));
        }

        self.menu_bar(ctx);

        if self.startup_open {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.heading(egui::RichText::new("Scenarist").size(32.0).weak());
                });
            });
            if let Some(choice) = dialogs::startup(ctx, self.can_recover) {
                self.handle_startup_choice(choice);
            }
        } else {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                let action = toolbar::show(
                    ui,
                    self.view.selection.len(),
                    self.selected_pair_connected(),
                );
                match action {
                    toolbar::ToolbarAction::NewNote => self.create_note_at(self.view.pointer),
                    toolbar::ToolbarAction::ConnectSelected => self.connect_selected(),
                    toolbar::ToolbarAction::DisconnectSelected => self.disconnect_selected(),
                    toolbar::ToolbarAction::DeleteSelected => self.delete_selected(),
                    toolbar::ToolbarAction::None => {}
                }
            });

            self.status_bar(ctx);

            let properties_action = egui::SidePanel::right("properties")
                .default_width(280.0)
                .show(ctx, |ui| {
                    properties::show(
                        ui,
                        &self.store,
                        &self.view.selection,
                        &mut self.textures,
                        &self.player,
                    )
                })
                .inner;
            self.apply_properties_action(properties_action);

            let canvas_action = egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    canvas::show(
                        ui,
                        &self.store,
                        &mut self.view,
                        &mut self.textures,
                        &self.player,
                    )
                })
                .inner;
            self.apply_canvas_action(canvas_action);
            self.handle_dropped_files(ctx);

            // Keep the play/stop buttons in step with the clip
            if self.player.is_active() {
                ctx.request_repaint_after(Duration::from_millis(250));
            }

            if !self.exit_dialog_open {
                self.handle_shortcuts(ctx);
            }
        }

        if self.exit_dialog_open {
            self.show_exit_dialog(ctx);
        }
        dialogs::error(ctx, &mut self.error_message);

        self.flush_changes();
        self.update_window_title(ctx);
    }
}
