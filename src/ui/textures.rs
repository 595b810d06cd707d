// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Texture cache for embedded images.
//!
//! Images are decoded from their data URI the first time they are shown
//! and kept as egui textures keyed by a hash of the URI.

use crate::io::media;
use crate::models::note::Note;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

#[derive(Default)]
pub struct TextureCache {
    // `None` marks an image that failed to decode, so it is not retried.
    entries: HashMap<u64, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for an embedded image, decoding it on first use.
    pub fn get(&mut self, ctx: &egui::Context, src: &str) -> Option<egui::TextureId> {
        let key = key_of(src);
        self.entries
            .entry(key)
            .or_insert_with(|| load(ctx, key, src))
            .as_ref()
            .map(|texture| texture.id())
    }

    /// Drop textures no note refers to anymore.
    pub fn retain(&mut self, notes: &[Note]) {
        let live: HashSet<u64> = notes
            .iter()
            .flat_map(|note| note.images.iter())
            .map(|image| key_of(&image.src))
            .collect();
        self.entries.retain(|key, _| live.contains(key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn key_of(src: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

fn load(ctx: &egui::Context, key: u64, src: &str) -> Option<egui::TextureHandle> {
    match media::decode_image(src) {
        Ok(loaded) => {
            let size = [loaded.width as usize, loaded.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
            Some(ctx.load_texture(
                format!("attachment-{:016x}", key),
                color_image,
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(e) => {
            log::warn!("Cannot display image attachment: {}", e);
            None
        }
    }
}
