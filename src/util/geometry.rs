// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between canvas coordinates (where notes live) and
//! screen coordinates relative to the canvas widget, and hit-tests notes.

use crate::models::note::{Note, NoteId, Point};

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Side length of the resize grip in the bottom-right corner of a note,
/// in screen pixels.
pub const RESIZE_GRIP: f64 = 14.0;

/// Pan and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas point shown at the widget's top-left corner.
    pub offset: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Point::default(),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Convert a canvas point to widget-relative screen coordinates.
    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset.x) * self.zoom,
            (point.y - self.offset.y) * self.zoom,
        )
    }

    /// Convert widget-relative screen coordinates to a canvas point.
    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            screen.x / self.zoom + self.offset.x,
            screen.y / self.zoom + self.offset.y,
        )
    }

    /// Move the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset.x -= dx / self.zoom;
        self.offset.y -= dy / self.zoom;
    }

    /// Set the zoom, keeping the canvas point under `anchor` fixed.
    pub fn zoom_around(&mut self, zoom: f64, anchor: Point) {
        let before = self.to_canvas(anchor);
        self.zoom = clamp_zoom(zoom);
        let after = self.to_canvas(anchor);
        self.offset.x += before.x - after.x;
        self.offset.y += before.y - after.y;
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Whether a canvas point lies inside the note.
pub fn note_contains(note: &Note, point: Point) -> bool {
    point.x >= note.x
        && point.x <= note.x + note.width
        && point.y >= note.y
        && point.y <= note.y + note.height
}

/// Whether a canvas point lies on the note's resize grip.
pub fn on_resize_grip(note: &Note, point: Point, zoom: f64) -> bool {
    let grip = RESIZE_GRIP / zoom;
    note_contains(note, point)
        && point.x >= note.x + note.width - grip
        && point.y >= note.y + note.height - grip
}

/// Topmost note under a canvas point. Later notes are drawn on top.
pub fn hit_test(notes: &[Note], point: Point) -> Option<&Note> {
    notes.iter().rev().find(|n| note_contains(n, point))
}

/// Note that receives files dropped at `point`.
///
/// The note under the pointer wins; otherwise a single selected note.
pub fn drop_target(notes: &[Note], point: Point, selection: &[NoteId]) -> Option<NoteId> {
    match hit_test(notes, point) {
        Some(note) => Some(note.id),
        None => match selection {
            &[id] => Some(id),
            _ => None,
        },
    }
}

/// Centre of a note in canvas coordinates.
pub fn note_center(note: &Note) -> Point {
    Point::new(note.x + note.width / 2.0, note.y + note.height / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_canvas_roundtrip() {
        let view = Viewport {
            offset: Point::new(-120.0, 35.0),
            zoom: 1.5,
        };
        let point = Point::new(310.0, -42.0);
        let back = view.to_canvas(view.to_screen(point));

        assert!((back.x - point.x).abs() < 0.0001);
        assert!((back.y - point.y).abs() < 0.0001);
    }

    #[test]
    fn test_zoom_is_clamped_and_anchored() {
        let mut view = Viewport::default();
        let anchor = Point::new(200.0, 100.0);
        let under_cursor = view.to_canvas(anchor);

        view.zoom_around(5.0, anchor);
        assert_eq!(view.zoom, MAX_ZOOM);
        let still = view.to_canvas(anchor);
        assert!((still.x - under_cursor.x).abs() < 0.0001);
        assert!((still.y - under_cursor.y).abs() < 0.0001);

        view.zoom_around(0.01, anchor);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_pan_moves_offset_in_canvas_units() {
        let mut view = Viewport {
            offset: Point::default(),
            zoom: 2.0,
        };
        view.pan_by(40.0, -20.0);
        assert_eq!(view.offset, Point::new(-20.0, 10.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let below = Note::new(1, Point::new(0.0, 0.0));
        let above = Note::new(2, Point::new(100.0, 100.0));
        let notes = vec![below, above];

        assert_eq!(hit_test(&notes, Point::new(150.0, 120.0)).map(|n| n.id), Some(2));
        assert_eq!(hit_test(&notes, Point::new(10.0, 10.0)).map(|n| n.id), Some(1));
        assert!(hit_test(&notes, Point::new(-5.0, 10.0)).is_none());
    }

    #[test]
    fn test_resize_grip() {
        let note = Note::new(1, Point::new(0.0, 0.0));
        assert!(on_resize_grip(&note, Point::new(195.0, 145.0), 1.0));
        assert!(!on_resize_grip(&note, Point::new(100.0, 145.0), 1.0));
        // At half zoom the grip covers twice as many canvas units
        assert!(on_resize_grip(&note, Point::new(175.0, 125.0), 0.5));
    }

    #[test]
    fn test_drop_target() {
        let notes = vec![
            Note::new(1, Point::new(0.0, 0.0)),
            Note::new(2, Point::new(400.0, 0.0)),
        ];
        let on_second = Point::new(450.0, 20.0);
        let empty = Point::new(-50.0, -50.0);

        assert_eq!(drop_target(&notes, on_second, &[1]), Some(2));
        assert_eq!(drop_target(&notes, empty, &[1]), Some(1));
        assert_eq!(drop_target(&notes, empty, &[1, 2]), None);
        assert_eq!(drop_target(&notes, empty, &[]), None);
    }
}
