// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Infinite canvas for notes and their connections.
//!
//! This module draws the document and turns pointer gestures into
//! [`CanvasAction`]s. Pan and zoom are view state and are applied here
//! directly; everything that touches the document is left to the caller.

use super::textures::TextureCache;
use crate::app::{Drag, ViewState};
use crate::io::playback::AudioPlayer;
use crate::models::{
    note::{Note, NoteId, Point, Size},
    store::DocumentStore,
};
use crate::util::geometry::{self, Viewport};
use egui::{pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Shape, Stroke};

const IMPORTANT_COLOR: Color32 = Color32::from_rgb(0xFF, 0xD6, 0x00);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Select { id: NoteId, additive: bool },
    ClearSelection,
    CreateNote(Point),
    MoveNotes { ids: Vec<NoteId>, dx: f64, dy: f64 },
    ResizeNote { id: NoteId, size: Size },
}

/// Display the canvas and handle pointer interactions.
pub fn show(
    ui: &mut egui::Ui,
    store: &DocumentStore,
    view: &mut ViewState,
    textures: &mut TextureCache,
    player: &AudioPlayer,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    let ctx = ui.ctx().clone();
    let visuals = ui.visuals().clone();

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, visuals.extreme_bg_color);

    if let Some(pos) = response.hover_pos() {
        view.pointer = canvas_point(&view.viewport, rect, pos);
    }

    // Zoom with Ctrl+scroll or pinch, pan with plain scroll
    if response.hovered() {
        let (zoom_delta, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta));
        if zoom_delta != 1.0 {
            if let Some(pos) = response.hover_pos() {
                let anchor = Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                let zoom = view.viewport.zoom * zoom_delta as f64;
                view.viewport.zoom_around(zoom, anchor);
            }
        }
        if scroll != egui::Vec2::ZERO {
            view.viewport.pan_by(scroll.x as f64, scroll.y as f64);
        }
    }

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let point = canvas_point(&view.viewport, rect, pos);
            view.drag = Some(match geometry::hit_test(store.notes(), point) {
                Some(note) if geometry::on_resize_grip(note, point, view.viewport.zoom) => {
                    Drag::Resize {
                        id: note.id,
                        start: note.size(),
                        dx: 0.0,
                        dy: 0.0,
                    }
                }
                Some(note) => {
                    if view.is_selected(note.id) {
                        Drag::MoveNotes(view.selection.clone())
                    } else {
                        action = CanvasAction::Select {
                            id: note.id,
                            additive: false,
                        };
                        Drag::MoveNotes(vec![note.id])
                    }
                }
                None => Drag::Pan,
            });
        }
    }

    if response.dragged() && matches!(action, CanvasAction::None) {
        let delta = response.drag_delta();
        let zoom = view.viewport.zoom;
        match &mut view.drag {
            Some(Drag::MoveNotes(ids)) if delta != egui::Vec2::ZERO => {
                action = CanvasAction::MoveNotes {
                    ids: ids.clone(),
                    dx: delta.x as f64 / zoom,
                    dy: delta.y as f64 / zoom,
                };
            }
            Some(Drag::Resize { id, start, dx, dy }) => {
                *dx += delta.x as f64 / zoom;
                *dy += delta.y as f64 / zoom;
                action = CanvasAction::ResizeNote {
                    id: *id,
                    size: Size::new(start.width + *dx, start.height + *dy),
                };
            }
            Some(Drag::Pan) => view.viewport.pan_by(delta.x as f64, delta.y as f64),
            _ => {}
        }
    }

    if response.drag_stopped() {
        view.drag = None;
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let point = canvas_point(&view.viewport, rect, pos);
            let additive = ui.input(|i| i.modifiers.command || i.modifiers.shift);
            action = match geometry::hit_test(store.notes(), point) {
                Some(note) => CanvasAction::Select {
                    id: note.id,
                    additive,
                },
                None => CanvasAction::ClearSelection,
            };
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let point = canvas_point(&view.viewport, rect, pos);
            if geometry::hit_test(store.notes(), point).is_none() {
                action = CanvasAction::CreateNote(point);
            }
        }
    }

    if response.secondary_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            view.context_point = canvas_point(&view.viewport, rect, pos);
        }
    }

    // Connections first so notes cover the line ends
    let zoom = view.viewport.zoom as f32;
    let line = Stroke::new(2.0 * zoom, visuals.widgets.noninteractive.fg_stroke.color);
    for connection in store.connections() {
        let (Some(from), Some(to)) = (
            store.note(connection.from_note_id),
            store.note(connection.to_note_id),
        ) else {
            continue;
        };
        painter.line_segment(
            [
                screen_pos(&view.viewport, rect, geometry::note_center(from)),
                screen_pos(&view.viewport, rect, geometry::note_center(to)),
            ],
            line,
        );
    }

    for note in store.notes() {
        let selected = view.is_selected(note.id);
        draw_note(&painter, &ctx, note, &view.viewport, rect, selected, textures, player, &visuals);
    }

    if store.notes().is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Double-click or press Enter to add a note",
            FontId::proportional(16.0),
            visuals.weak_text_color(),
        );
    }

    response.context_menu(|ui| {
        if ui.button("Create note here").clicked() {
            action = CanvasAction::CreateNote(view.context_point);
            ui.close_menu();
        }
    });

    action
}

fn canvas_point(viewport: &Viewport, rect: Rect, pos: Pos2) -> Point {
    viewport.to_canvas(Point::new(
        (pos.x - rect.min.x) as f64,
        (pos.y - rect.min.y) as f64,
    ))
}

fn screen_pos(viewport: &Viewport, rect: Rect, point: Point) -> Pos2 {
    let screen = viewport.to_screen(point);
    pos2(rect.min.x + screen.x as f32, rect.min.y + screen.y as f32)
}

/// Draw one note with its title, text, and attachments.
#[allow(clippy::too_many_arguments)]
fn draw_note(
    painter: &egui::Painter,
    ctx: &egui::Context,
    note: &Note,
    viewport: &Viewport,
    canvas: Rect,
    selected: bool,
    textures: &mut TextureCache,
    player: &AudioPlayer,
    visuals: &egui::Visuals,
) {
    let zoom = viewport.zoom as f32;
    let note_rect = Rect::from_min_size(
        screen_pos(viewport, canvas, note.position()),
        vec2(note.width as f32 * zoom, note.height as f32 * zoom),
    );
    if !note_rect.intersects(canvas) {
        return;
    }

    let rounding = 8.0 * zoom;
    painter.rect_filled(note_rect, rounding, visuals.window_fill());
    let border = if selected {
        Stroke::new(2.5 * zoom, visuals.selection.stroke.color)
    } else if note.important {
        Stroke::new(2.0 * zoom, IMPORTANT_COLOR)
    } else {
        visuals.window_stroke()
    };
    painter.rect_stroke(note_rect, rounding, border);

    let inner = painter.with_clip_rect(note_rect.shrink(1.0).intersect(canvas));
    let pad = 8.0 * zoom;
    let wrap = (note_rect.width() - 2.0 * pad).max(1.0);
    let mut cursor = note_rect.min + vec2(pad, pad);

    let title = if note.important {
        format!("★ {}", note.title)
    } else {
        note.title.clone()
    };
    let galley = inner.layout(
        title,
        FontId::proportional(15.0 * zoom),
        visuals.strong_text_color(),
        wrap,
    );
    cursor.y += galley.size().y + 4.0 * zoom;
    inner.galley(note_rect.min + vec2(pad, pad), galley, visuals.strong_text_color());

    if !note.content.is_empty() {
        let galley = inner.layout(
            note.content.clone(),
            FontId::proportional(12.0 * zoom),
            visuals.text_color(),
            wrap,
        );
        let height = galley.size().y;
        inner.galley(cursor, galley, visuals.text_color());
        cursor.y += height + 6.0 * zoom;
    }

    for image in &note.images {
        let image_rect = Rect::from_min_size(cursor, vec2(image.w as f32 * zoom, image.h as f32 * zoom));
        match textures.get(ctx, &image.src) {
            Some(texture) => {
                inner.image(
                    texture,
                    image_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                inner.rect_stroke(image_rect, 0.0, visuals.window_stroke());
            }
        }
        cursor.y += image_rect.height() + 4.0 * zoom;
    }

    for audio in &note.audios {
        let (glyph, color) = if player.is_playing(audio) {
            ("▶", visuals.selection.stroke.color)
        } else {
            ("♪", visuals.text_color())
        };
        inner.text(
            cursor,
            Align2::LEFT_TOP,
            format!("{} {}", glyph, audio.name),
            FontId::proportional(12.0 * zoom),
            color,
        );
        cursor.y += 16.0 * zoom;
    }

    // Resize grip, constant size on screen
    let grip = geometry::RESIZE_GRIP as f32;
    let corner = note_rect.max;
    painter.add(Shape::convex_polygon(
        vec![corner, pos2(corner.x, corner.y - grip), pos2(corner.x - grip, corner.y)],
        visuals.widgets.inactive.bg_fill,
        Stroke::NONE,
    ));
}
