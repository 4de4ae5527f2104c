//! Append-only persistence of completed sheets.
//!
//! The engine only ever appends. Reading and rendering stored sheets belong
//! to the caller.

use crate::wizard::CompletedSheet;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use uuid::Uuid;

/// A stored completed sheet and the build session that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSheet {
    pub session: Uuid,
    pub sheet: CompletedSheet,
}

/// Destination for completed sheets.
pub trait SheetStore {
    fn append(&mut self, session: Uuid, sheet: &CompletedSheet) -> io::Result<()>;
}

/// Keeps sheets in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<StoredSheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StoredSheet] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SheetStore for MemoryStore {
    fn append(&mut self, session: Uuid, sheet: &CompletedSheet) -> io::Result<()> {
        self.entries.push(StoredSheet {
            session,
            sheet: sheet.clone(),
        });
        Ok(())
    }
}

/// Writes one JSON record per line.
#[derive(Debug)]
pub struct JsonLinesStore<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesStore<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SheetStore for JsonLinesStore<W> {
    fn append(&mut self, session: Uuid, sheet: &CompletedSheet) -> io::Result<()> {
        let record = StoredSheet {
            session,
            sheet: sheet.clone(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
