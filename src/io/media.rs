// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media attachments (images and audio).
//!
//! Attachments are embedded into notes as `data:` URIs. This module turns
//! files into attachments and decodes embedded images into RGBA pixels
//! suitable for display in egui.

use crate::error::{Result, ScenarioError};
use crate::models::note::{AttachmentEdit, AudioAttachment, ImageAttachment};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Extensions offered by the image picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Extensions treated as audio clips.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "m4a", "flac"];

/// A decoded image ready to become a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Build a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URI into its MIME type and payload.
pub fn parse_data_uri(uri: &str) -> Option<(&str, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime, bytes))
}

/// Read an image file into an attachment with the default display size.
pub fn load_image_attachment(path: &Path) -> Result<ImageAttachment> {
    let bytes = std::fs::read(path).map_err(|e| ScenarioError::io("read", path, e))?;
    let format = image::guess_format(&bytes).map_err(|e| ScenarioError::Media {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("Attached image {} ({} bytes)", path.display(), bytes.len());
    Ok(ImageAttachment::new(data_uri(format.to_mime_type(), &bytes)))
}

/// Read an audio file into an attachment named after the file.
pub fn load_audio_attachment(path: &Path) -> Result<AudioAttachment> {
    let bytes = std::fs::read(path).map_err(|e| ScenarioError::io("read", path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("Attached audio {} ({} bytes)", path.display(), bytes.len());
    Ok(AudioAttachment {
        src: data_uri(audio_mime(path), &bytes),
        name,
    })
}

/// Attach any supported file: audio by extension, anything else as an image.
pub fn load_attachment(path: &Path) -> Result<AttachmentEdit> {
    let is_audio = lowercase_extension(path)
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()));
    if is_audio {
        load_audio_attachment(path).map(AttachmentEdit::AddAudio)
    } else {
        load_image_attachment(path).map(AttachmentEdit::AddImage)
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn audio_mime(path: &Path) -> &'static str {
    match lowercase_extension(path).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Decode an embedded image into RGBA pixels.
pub fn decode_image(src: &str) -> std::result::Result<LoadedImage, String> {
    let (_, bytes) = parse_data_uri(src).ok_or_else(|| "not a base64 data URI".to_string())?;
    let img = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::DEFAULT_IMAGE_SIZE;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let uri = data_uri("audio/wav", b"RIFF");
        assert_eq!(uri, "data:audio/wav;base64,UklGRg==");
        let (mime, bytes) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime, "audio/wav");
        assert_eq!(bytes, b"RIFF");
    }

    #[test]
    fn test_parse_rejects_non_base64_uris() {
        assert!(parse_data_uri("https://example.com/a.png").is_none());
        assert!(parse_data_uri("data:text/plain,hello").is_none());
    }

    #[test]
    fn test_image_attachment_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, png_bytes(4, 3)).unwrap();

        let attachment = load_image_attachment(&path).unwrap();
        assert!(attachment.src.starts_with("data:image/png;base64,"));
        assert_eq!(attachment.size(), DEFAULT_IMAGE_SIZE);

        let decoded = decode_image(&attachment.src).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
        assert_eq!(decoded.pixels.len(), 4 * 3 * 4);
    }

    #[test]
    fn test_non_image_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();
        assert!(matches!(
            load_image_attachment(&path),
            Err(ScenarioError::Media { .. })
        ));
    }

    #[test]
    fn test_audio_attachment_keeps_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Theme.MP3");
        std::fs::write(&path, b"ID3").unwrap();

        let attachment = load_audio_attachment(&path).unwrap();
        assert_eq!(attachment.name, "Theme.MP3");
        assert!(attachment.src.starts_with("data:audio/mpeg;base64,"));
    }

    #[test]
    fn test_load_attachment_picks_kind() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("map.png");
        std::fs::write(&image, png_bytes(2, 2)).unwrap();
        let audio = dir.path().join("wind.OGG");
        std::fs::write(&audio, b"OggS").unwrap();
        let text = dir.path().join("readme.txt");
        std::fs::write(&text, "words").unwrap();

        assert!(matches!(load_attachment(&image), Ok(AttachmentEdit::AddImage(_))));
        match load_attachment(&audio) {
            Ok(AttachmentEdit::AddAudio(clip)) => {
                assert_eq!(clip.name, "wind.OGG");
                assert!(clip.src.starts_with("data:audio/ogg;base64,"));
            }
            _ => panic!("expected an audio attachment"),
        }
        assert!(matches!(load_attachment(&text), Err(ScenarioError::Media { .. })));
    }
}
