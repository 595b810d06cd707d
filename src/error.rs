// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application error type.

use crate::io::serialization::FormatError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("failed to {action} {}: {source}", .path.display())]
    FileIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot attach {}: {message}", .path.display())]
    Media { path: PathBuf, message: String },
}

impl ScenarioError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ScenarioError> = std::result::Result<T, E>;
