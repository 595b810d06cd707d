// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Note properties panel.
//!
//! This module provides the side panel for editing the selected note:
//! title, text, importance, geometry, and attachments. Edits are returned
//! as patches rather than written into the note.

use super::textures::TextureCache;
use crate::io::playback::AudioPlayer;
use crate::models::note::{
    commit_title, AttachmentEdit, Note, NoteId, NotePatch, Point, Size, IMAGE_BOUNDS,
    MAX_TITLE_CHARS, NOTE_BOUNDS,
};
use crate::models::store::DocumentStore;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    Update(NoteId, NotePatch),
    AttachImage(NoteId),
    AttachAudio(NoteId),
    PlayAudio { id: NoteId, index: usize },
    StopAudio,
    Delete(NoteId),
}

/// Widget id of a note's title field.
pub fn title_id(id: NoteId) -> egui::Id {
    egui::Id::new(("note_title", id))
}

/// Display the properties of the current selection.
pub fn show(
    ui: &mut egui::Ui,
    store: &DocumentStore,
    selection: &[NoteId],
    textures: &mut TextureCache,
    player: &AudioPlayer,
) -> PropertiesAction {
    ui.heading("Note");
    ui.separator();

    let note = match selection {
        [id] => store.note(*id),
        [] => {
            ui.label(egui::RichText::new("No note selected").weak());
            return PropertiesAction::None;
        }
        many => {
            ui.label(format!("{} notes selected", many.len()));
            return PropertiesAction::None;
        }
    };
    let Some(note) = note else {
        return PropertiesAction::None;
    };

    // Keyed by note so focus and edit state never carry over to another note
    ui.push_id(note.id, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| note_editor(ui, note, textures, player))
            .inner
    })
    .inner
}

fn note_editor(
    ui: &mut egui::Ui,
    note: &Note,
    textures: &mut TextureCache,
    player: &AudioPlayer,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    let mut patch = NotePatch::default();

    ui.label("Title");
    let mut title = note.title.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut title)
            .id(title_id(note.id))
            .char_limit(MAX_TITLE_CHARS)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        patch.title = Some(title.clone());
    }
    if response.lost_focus() {
        let committed = commit_title(&title);
        if committed != note.title {
            patch.title = Some(committed);
        }
    }

    let mut important = note.important;
    if ui.checkbox(&mut important, "★ Important").changed() {
        patch.important = Some(important);
    }

    ui.add_space(4.0);
    ui.label("Text");
    let mut content = note.content.clone();
    if ui
        .add(
            egui::TextEdit::multiline(&mut content)
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        )
        .changed()
    {
        patch.content = Some(content);
    }

    ui.add_space(4.0);
    egui::Grid::new("note_geometry").num_columns(2).show(ui, |ui| {
        let (mut x, mut y) = (note.x, note.y);
        ui.label("Position");
        ui.horizontal(|ui| {
            let moved_x = ui.add(egui::DragValue::new(&mut x).prefix("x ")).changed();
            let moved_y = ui.add(egui::DragValue::new(&mut y).prefix("y ")).changed();
            if moved_x || moved_y {
                patch.position = Some(Point::new(x, y));
            }
        });
        ui.end_row();

        let (mut width, mut height) = (note.width, note.height);
        ui.label("Size");
        ui.horizontal(|ui| {
            let resized_w = ui
                .add(
                    egui::DragValue::new(&mut width)
                        .clamp_range(NOTE_BOUNDS.min.width..=NOTE_BOUNDS.max.width)
                        .prefix("w "),
                )
                .changed();
            let resized_h = ui
                .add(
                    egui::DragValue::new(&mut height)
                        .clamp_range(NOTE_BOUNDS.min.height..=NOTE_BOUNDS.max.height)
                        .prefix("h "),
                )
                .changed();
            if resized_w || resized_h {
                patch.size = Some(Size::new(width, height));
            }
        });
        ui.end_row();
    });

    ui.separator();
    ui.label(format!("Images ({})", note.images.len()));
    for (index, image) in note.images.iter().enumerate() {
        ui.push_id(("image", index), |ui| {
            if let Some(texture) = textures.get(ui.ctx(), &image.src) {
                let size = egui::vec2(image.w as f32, image.h as f32);
                let preview = size * (160.0 / size.x.max(160.0));
                ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                    texture, preview,
                )));
            }
            ui.horizontal(|ui| {
                let (mut w, mut h) = (image.w, image.h);
                let changed_w = ui
                    .add(
                        egui::DragValue::new(&mut w)
                            .clamp_range(IMAGE_BOUNDS.min.width..=IMAGE_BOUNDS.max.width)
                            .prefix("w "),
                    )
                    .changed();
                let changed_h = ui
                    .add(
                        egui::DragValue::new(&mut h)
                            .clamp_range(IMAGE_BOUNDS.min.height..=IMAGE_BOUNDS.max.height)
                            .prefix("h "),
                    )
                    .changed();
                if changed_w || changed_h {
                    patch.attachments.push(AttachmentEdit::ResizeImage {
                        index,
                        size: Size::new(w, h),
                    });
                }
                if ui.small_button("Remove").clicked() {
                    patch.attachments.push(AttachmentEdit::RemoveImage(index));
                }
            });
        });
    }
    if ui.button("Attach image…").clicked() {
        action = PropertiesAction::AttachImage(note.id);
    }

    ui.separator();
    ui.label(format!("Audio ({})", note.audios.len()));
    for (index, audio) in note.audios.iter().enumerate() {
        ui.push_id(("audio", index), |ui| {
            ui.horizontal(|ui| {
                if player.is_playing(audio) {
                    if ui.small_button("■ Stop").clicked() {
                        action = PropertiesAction::StopAudio;
                    }
                } else if ui.small_button("▶ Play").clicked() {
                    action = PropertiesAction::PlayAudio { id: note.id, index };
                }
                ui.label(format!("♪ {}", audio.name));
                if ui.small_button("Remove").clicked() {
                    patch.attachments.push(AttachmentEdit::RemoveAudio(index));
                }
            });
        });
    }
    if ui.button("Attach audio…").clicked() {
        action = PropertiesAction::AttachAudio(note.id);
    }

    ui.separator();
    if ui
        .button(egui::RichText::new("Delete note").color(ui.visuals().error_fg_color))
        .clicked()
    {
        action = PropertiesAction::Delete(note.id);
    }

    if matches!(action, PropertiesAction::None) && !patch.is_empty() {
        action = PropertiesAction::Update(note.id, patch);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(
        ctx: &egui::Context,
        store: &DocumentStore,
        selection: &[NoteId],
        textures: &mut TextureCache,
    ) -> PropertiesAction {
        let player = AudioPlayer::new();
        let mut action = PropertiesAction::None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                action = show(ui, store, selection, textures, &player);
            });
        });
        action
    }

    #[test]
    fn test_title_focus_stays_with_its_note() {
        let ctx = egui::Context::default();
        let store = DocumentStore::with_sample_notes();
        let mut textures = TextureCache::new();

        ctx.memory_mut(|m| m.request_focus(title_id(1)));
        frame(&ctx, &store, &[1], &mut textures);

        // Switching notes must not hand the focused field to the new note
        let action = frame(&ctx, &store, &[2], &mut textures);
        assert!(!ctx.memory(|m| m.has_focus(title_id(2))));
        assert!(!matches!(action, PropertiesAction::Update(2, _)));
        assert_eq!(store.note(2).map(|n| n.title.as_str()), Some("First encounter"));
    }

    #[test]
    fn test_title_ids_differ_per_note() {
        assert_ne!(title_id(1), title_id(2));
        assert_eq!(title_id(3), title_id(3));
    }
}
