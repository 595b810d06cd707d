// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback of embedded audio clips.
//!
//! One clip plays at a time. The output device is opened on first use so
//! machines without audio can still edit documents.

use super::media;
use crate::models::note::{AudioAttachment, Note};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;

/// Decoder over the bytes of an embedded clip.
pub type ClipSource = Decoder<Cursor<Vec<u8>>>;

/// Decode an embedded clip's data URI into a playable source.
pub fn decode_clip(src: &str) -> Result<ClipSource, String> {
    let (_, bytes) = media::parse_data_uri(src).ok_or_else(|| "not a base64 data URI".to_string())?;
    Decoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())
}

struct Playing {
    src: String,
    sink: Sink,
}

#[derive(Default)]
pub struct AudioPlayer {
    // Dropping the stream silences every sink on it.
    output: Option<(OutputStream, OutputStreamHandle)>,
    playing: Option<Playing>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `clip`, stopping whatever was playing.
    pub fn play(&mut self, clip: &AudioAttachment) -> Result<(), String> {
        self.stop();
        let source = decode_clip(&clip.src)?;

        if self.output.is_none() {
            let output = OutputStream::try_default().map_err(|e| e.to_string())?;
            self.output = Some(output);
        }
        let Some((_, handle)) = &self.output else {
            return Err("no audio output".to_string());
        };

        let sink = Sink::try_new(handle).map_err(|e| e.to_string())?;
        sink.append(source);
        log::info!("Playing {}", clip.name);
        self.playing = Some(Playing {
            src: clip.src.clone(),
            sink,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(playing) = self.playing.take() {
            playing.sink.stop();
        }
    }

    /// Whether `clip` is the one currently audible.
    pub fn is_playing(&self, clip: &AudioAttachment) -> bool {
        self.playing
            .as_ref()
            .is_some_and(|p| p.src == clip.src && !p.sink.empty())
    }

    /// Whether any clip is still audible.
    pub fn is_active(&self) -> bool {
        self.playing.as_ref().is_some_and(|p| !p.sink.empty())
    }

    /// Stop playback when no note holds the playing clip anymore.
    pub fn retain(&mut self, notes: &[Note]) {
        let Some(playing) = &self.playing else {
            return;
        };
        let still_attached = notes
            .iter()
            .flat_map(|note| note.audios.iter())
            .any(|audio| audio.src == playing.src);
        if !still_attached {
            self.stop();
        }
    }
}
