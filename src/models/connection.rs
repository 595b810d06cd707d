// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Links between notes.

use super::note::NoteId;
use serde::{Deserialize, Serialize};

/// Identifier of a connection.
pub type ConnectionId = u64;

/// An undirected link between two notes.
///
/// The `from`/`to` naming only reflects creation order; a connection
/// between `a` and `b` is the same link as one between `b` and `a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_note_id: NoteId,
    pub to_note_id: NoteId,
}

impl Connection {
    pub fn new(id: ConnectionId, from_note_id: NoteId, to_note_id: NoteId) -> Self {
        Self {
            id,
            from_note_id,
            to_note_id,
        }
    }

    /// Whether this connection links `a` and `b`, in either order.
    pub fn links(&self, a: NoteId, b: NoteId) -> bool {
        self.pair() == unordered_pair(a, b)
    }

    /// Whether either endpoint is `id`.
    pub fn touches(&self, id: NoteId) -> bool {
        self.from_note_id == id || self.to_note_id == id
    }

    /// Endpoints as a sorted pair.
    pub fn pair(&self) -> (NoteId, NoteId) {
        unordered_pair(self.from_note_id, self.to_note_id)
    }
}

fn unordered_pair(a: NoteId, b: NoteId) -> (NoteId, NoteId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_is_order_independent() {
        let connection = Connection::new(1, 4, 2);
        assert!(connection.links(4, 2));
        assert!(connection.links(2, 4));
        assert!(!connection.links(2, 3));
        assert_eq!(connection.pair(), (2, 4));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&Connection::new(9, 1, 2)).unwrap();
        assert_eq!(json, r#"{"id":9,"fromNoteId":1,"toNoteId":2}"#);
    }
}
