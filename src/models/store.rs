// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory document store.
//!
//! The store owns the note/connection graph and is the only place it is
//! mutated. Mutating operations report whether anything changed so the
//! caller knows when to notify persistence.

use super::{
    connection::{Connection, ConnectionId},
    note::{Note, NoteId, NotePatch, Point},
    project::{Document, IdOutOfRange},
};

/// Mutable graph of notes and connections for one session.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    notes: Vec<Note>,
    connections: Vec<Connection>,
    next_note_id: NoteId,
    next_connection_id: ConnectionId,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            connections: Vec::new(),
            next_note_id: 1,
            next_connection_id: 1,
        }
    }

    /// Create a store pre-populated with the sample scenario.
    pub fn with_sample_notes() -> Self {
        let mut store = Self::new();
        let samples = [
            (
                Point::new(50.0, 50.0),
                "Beginning of the story",
                "The hero wakes up in an unfamiliar place...",
            ),
            (
                Point::new(300.0, 50.0),
                "First encounter",
                "The hero meets a mysterious stranger...",
            ),
            (
                Point::new(150.0, 200.0),
                "Key decision",
                "The hero has to make an important choice...",
            ),
        ];

        let mut ids = Vec::with_capacity(samples.len());
        for (position, title, content) in samples {
            let id = store.create_note(position).id;
            store.update_note(
                id,
                NotePatch {
                    title: Some(title.to_string()),
                    content: Some(content.to_string()),
                    ..Default::default()
                },
            );
            ids.push(id);
        }
        for pair in ids.windows(2) {
            store.create_connection(pair[0], pair[1]);
        }
        store
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.note(id).is_some()
    }

    /// Connections whose endpoints both exist.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections
            .iter()
            .filter(|c| self.contains(c.from_note_id) && self.contains(c.to_note_id))
    }

    /// Id the next created note will receive.
    pub fn next_note_id(&self) -> NoteId {
        self.next_note_id
    }

    /// Create a note at `position` with default fields.
    pub fn create_note(&mut self, position: Point) -> &Note {
        let id = self.next_note_id;
        self.next_note_id += 1;
        self.notes.push(Note::new(id, position));
        log::info!("Created note {}, total: {}", id, self.notes.len());
        &self.notes[self.notes.len() - 1]
    }

    /// Apply `patch` to note `id`. Returns `false` if the note does not exist
    /// or the patch is empty.
    pub fn update_note(&mut self, id: NoteId, patch: NotePatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Delete note `id` together with every connection touching it.
    pub fn delete_note(&mut self, id: NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return false;
        }
        self.connections.retain(|c| !c.touches(id));
        log::info!("Deleted note {}, total: {}", id, self.notes.len());
        true
    }

    /// Find the connection between `a` and `b`, in either order.
    pub fn find_connection(&self, a: NoteId, b: NoteId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.links(a, b))
    }

    /// Connect `a` and `b`.
    ///
    /// Returns the existing connection if the pair is already linked. Returns
    /// `None` without touching the store when either note is missing or
    /// `a == b`.
    pub fn create_connection(&mut self, a: NoteId, b: NoteId) -> Option<&Connection> {
        if a == b {
            log::warn!("Refusing to connect note {} to itself", a);
            return None;
        }
        if !self.contains(a) || !self.contains(b) {
            log::warn!("Refusing to connect missing notes {} and {}", a, b);
            return None;
        }
        if let Some(index) = self.connections.iter().position(|c| c.links(a, b)) {
            return Some(&self.connections[index]);
        }

        let id = self.next_connection_id;
        self.next_connection_id += 1;
        self.connections.push(Connection::new(id, a, b));
        log::info!("Connected notes {} and {}", a, b);
        self.connections.last()
    }

    /// Connect every unordered pair of `ids` that is not linked yet.
    /// Returns the number of connections created.
    pub fn connect_all(&mut self, ids: &[NoteId]) -> usize {
        let mut created = 0;
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if self.find_connection(a, b).is_none() && self.create_connection(a, b).is_some() {
                    created += 1;
                }
            }
        }
        created
    }

    /// Remove connection `id`.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    /// Remove the connection between `a` and `b`, in either order.
    pub fn remove_connection_between(&mut self, a: NoteId, b: NoteId) -> bool {
        let Some(id) = self.find_connection(a, b).map(|c| c.id) else {
            return false;
        };
        self.remove_connection(id)
    }

    /// Snapshot the document. Connections with a missing endpoint are left out.
    pub fn serialize(&self) -> Document {
        Document {
            notes: self.notes.clone(),
            connections: self.connections().cloned().collect(),
        }
    }

    /// Replace the whole graph, as when loading a file.
    ///
    /// Fails without touching the store when an id is too large for the
    /// counters to continue from.
    pub fn replace(&mut self, document: Document) -> Result<(), IdOutOfRange> {
        let (next_note_id, next_connection_id) = document.next_ids()?;
        let Document {
            mut notes,
            connections,
        } = document;
        for note in &mut notes {
            note.clamp_sizes();
        }

        self.next_note_id = next_note_id;
        self.next_connection_id = next_connection_id;
        self.notes = notes;
        self.connections = connections;
        log::info!(
            "Loaded {} notes and {} connections",
            self.notes.len(),
            self.connections.len()
        );
        Ok(())
    }
}
