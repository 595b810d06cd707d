// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! File destination and source prompts.

use crate::io::serialization::FILE_EXTENSION;
use std::path::PathBuf;

/// Asks the user where to save to or what to open.
///
/// `None` means the user dismissed the prompt.
pub trait FilePrompt {
    fn save_destination(&self, suggested_name: &str) -> Option<PathBuf>;
    fn open_source(&self) -> Option<PathBuf>;
}

/// Native dialogs backed by `rfd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFilePrompt;

impl FilePrompt for NativeFilePrompt {
    fn save_destination(&self, suggested_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Save scenario")
            .add_filter("Scenarios", &[FILE_EXTENSION])
            .set_file_name(suggested_name)
            .save_file()
    }

    fn open_source(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Open scenario")
            .add_filter("Scenarios", &[FILE_EXTENSION])
            .pick_file()
    }
}
