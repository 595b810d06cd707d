// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Note data structures.
//!
//! This module defines the notes placed on the canvas, their embedded
//! image and audio attachments, and the size bounds they must respect.

use serde::{Deserialize, Serialize};

/// Identifier of a note, unique within a document.
pub type NoteId = u64;

/// Title given to new notes and to notes whose title was cleared.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Longest title accepted from the title field, in characters.
pub const MAX_TITLE_CHARS: usize = 60;

/// Size of a freshly created note.
pub const DEFAULT_NOTE_SIZE: Size = Size::new(200.0, 150.0);

/// Display size of a freshly attached image.
pub const DEFAULT_IMAGE_SIZE: Size = Size::new(120.0, 80.0);

/// Inclusive bounds for a two-dimensional size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub min: Size,
    pub max: Size,
}

impl SizeBounds {
    /// Clamp `size` into these bounds, one axis at a time.
    pub fn clamp(&self, size: Size) -> Size {
        Size {
            width: size.width.clamp(self.min.width, self.max.width),
            height: size.height.clamp(self.min.height, self.max.height),
        }
    }
}

/// Allowed note sizes.
pub const NOTE_BOUNDS: SizeBounds = SizeBounds {
    min: Size::new(140.0, 100.0),
    max: Size::new(500.0, 400.0),
};

/// Allowed display sizes of embedded images.
pub const IMAGE_BOUNDS: SizeBounds = SizeBounds {
    min: Size::new(40.0, 30.0),
    max: Size::new(500.0, 400.0),
};

/// A position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An image embedded in a note as a data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub src: String,
    pub w: f64,
    pub h: f64,
}

impl ImageAttachment {
    /// Create an attachment with the default display size.
    pub fn new(src: String) -> Self {
        Self {
            src,
            w: DEFAULT_IMAGE_SIZE.width,
            h: DEFAULT_IMAGE_SIZE.height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Resize the image, clamped into [`IMAGE_BOUNDS`].
    pub fn resize(&mut self, size: Size) {
        let size = IMAGE_BOUNDS.clamp(size);
        self.w = size.width;
        self.h = size.height;
    }
}

/// An audio clip embedded in a note as a data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAttachment {
    pub src: String,
    /// Original file name of the clip.
    pub name: String,
}

/// A positioned, resizable block of text with optional attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    #[serde(default)]
    pub audios: Vec<AudioAttachment>,
    #[serde(default)]
    pub important: bool,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Note {
    /// Create an empty note at the given position with default size and title.
    pub fn new(id: NoteId, position: Point) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            width: DEFAULT_NOTE_SIZE.width,
            height: DEFAULT_NOTE_SIZE.height,
            content: String::new(),
            title: default_title(),
            images: Vec::new(),
            audios: Vec::new(),
            important: false,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Resize the note, clamped into [`NOTE_BOUNDS`].
    pub fn resize(&mut self, size: Size) {
        let size = NOTE_BOUNDS.clamp(size);
        self.width = size.width;
        self.height = size.height;
    }

    /// Pull every size on this note back into bounds.
    pub(crate) fn clamp_sizes(&mut self) {
        self.resize(self.size());
        for image in &mut self.images {
            image.resize(image.size());
        }
    }

    /// Apply a patch in place.
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = truncate_chars(&title, MAX_TITLE_CHARS);
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(position) = patch.position {
            self.x = position.x;
            self.y = position.y;
        }
        if let Some(size) = patch.size {
            self.resize(size);
        }
        if let Some(important) = patch.important {
            self.important = important;
        }
        for edit in patch.attachments {
            self.apply_attachment_edit(edit);
        }
    }

    fn apply_attachment_edit(&mut self, edit: AttachmentEdit) {
        match edit {
            AttachmentEdit::AddImage(mut image) => {
                image.resize(image.size());
                self.images.push(image);
            }
            AttachmentEdit::ResizeImage { index, size } => match self.images.get_mut(index) {
                Some(image) => image.resize(size),
                None => log::warn!("Note {} has no image at index {}", self.id, index),
            },
            AttachmentEdit::RemoveImage(index) => {
                if index < self.images.len() {
                    self.images.remove(index);
                }
            }
            AttachmentEdit::AddAudio(audio) => self.audios.push(audio),
            AttachmentEdit::RemoveAudio(index) => {
                if index < self.audios.len() {
                    self.audios.remove(index);
                }
            }
        }
    }
}

/// Normalize a title committed from the title field.
///
/// Surrounding whitespace is trimmed, the result is cut to
/// [`MAX_TITLE_CHARS`] characters, and an empty title becomes
/// [`DEFAULT_TITLE`].
pub fn commit_title(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_title();
    }
    truncate_chars(trimmed, MAX_TITLE_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// An edit to one of a note's attachment lists.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentEdit {
    AddImage(ImageAttachment),
    ResizeImage { index: usize, size: Size },
    RemoveImage(usize),
    AddAudio(AudioAttachment),
    RemoveAudio(usize),
}

/// A set of field changes to apply to a note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub important: Option<bool>,
    pub attachments: Vec<AttachmentEdit>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn important(important: bool) -> Self {
        Self {
            important: Some(important),
            ..Default::default()
        }
    }

    pub fn attachment(edit: AttachmentEdit) -> Self {
        Self {
            attachments: vec![edit],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_defaults() {
        let note = Note::new(7, Point::new(10.0, 20.0));
        assert_eq!(note.id, 7);
        assert_eq!(note.title, "Untitled");
        assert_eq!(note.size(), DEFAULT_NOTE_SIZE);
        assert!(note.content.is_empty());
        assert!(note.images.is_empty() && note.audios.is_empty());
        assert!(!note.important);
    }

    #[test]
    fn test_resize_clamps_to_note_bounds() {
        let mut note = Note::new(1, Point::default());
        note.resize(Size::new(10.0, 1000.0));
        assert_eq!(note.size(), Size::new(140.0, 400.0));
        note.resize(Size::new(900.0, 5.0));
        assert_eq!(note.size(), Size::new(500.0, 100.0));
    }

    #[test]
    fn test_image_resize_clamps_to_image_bounds() {
        let mut image = ImageAttachment::new("data:image/png;base64,".into());
        image.resize(Size::new(1.0, 999.0));
        assert_eq!(image.size(), Size::new(40.0, 400.0));
    }

    #[test]
    fn test_patch_truncates_title_while_typing() {
        let mut note = Note::new(1, Point::default());
        note.apply(NotePatch::title("x".repeat(80) + " "));
        assert_eq!(note.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_commit_title() {
        assert_eq!(commit_title("   "), "Untitled");
        assert_eq!(commit_title("  Opening scene "), "Opening scene");
        let long: String = "é".repeat(70);
        assert_eq!(commit_title(&long).chars().count(), 60);
    }

    #[test]
    fn test_attachment_edits() {
        let mut note = Note::new(1, Point::default());
        note.apply(NotePatch::attachment(AttachmentEdit::AddImage(
            ImageAttachment::new("data:image/png;base64,AAAA".into()),
        )));
        note.apply(NotePatch::attachment(AttachmentEdit::AddAudio(AudioAttachment {
            src: "data:audio/wav;base64,AAAA".into(),
            name: "rain.wav".into(),
        })));
        note.apply(NotePatch::attachment(AttachmentEdit::ResizeImage {
            index: 0,
            size: Size::new(600.0, 60.0),
        }));
        assert_eq!(note.images[0].size(), Size::new(500.0, 60.0));
        assert_eq!(note.audios[0].name, "rain.wav");

        // Out-of-range indexes are ignored
        note.apply(NotePatch::attachment(AttachmentEdit::RemoveImage(3)));
        assert_eq!(note.images.len(), 1);

        note.apply(NotePatch::attachment(AttachmentEdit::RemoveImage(0)));
        note.apply(NotePatch::attachment(AttachmentEdit::RemoveAudio(0)));
        assert!(note.images.is_empty() && note.audios.is_empty());
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let json = r#"{"id":3,"x":1,"y":2,"width":200,"height":150}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.title, "Untitled");
        assert!(note.audios.is_empty());
        assert!(!note.important);
    }
}
