// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document.
//!
//! This module defines the serializable aggregate of notes and
//! connections that makes up one scenario.

use super::{
    connection::{Connection, ConnectionId},
    note::{Note, NoteId},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest id a document may carry: the exact integer range of a JSON
/// number, leaving the counters room to keep growing.
pub const MAX_ID: u64 = (1 << 53) - 1;

/// A note or connection id above [`MAX_ID`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("id {0} is out of range (expected at most {max})", max = MAX_ID)]
pub struct IdOutOfRange(pub u64);

/// Complete scenario data for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// First free note and connection ids after everything in the document.
    pub fn next_ids(&self) -> Result<(NoteId, ConnectionId), IdOutOfRange> {
        let note_ids = self.notes.iter().map(|n| n.id);
        let connection_ids = self.connections.iter().map(|c| c.id);
        if let Some(id) = note_ids.clone().chain(connection_ids.clone()).find(|&id| id > MAX_ID) {
            return Err(IdOutOfRange(id));
        }
        Ok((
            note_ids.max().map_or(1, |max| max + 1),
            connection_ids.max().map_or(1, |max| max + 1),
        ))
    }
}
