//! Struct archiving functionality
//!
//! Module state is archived once per cycle as CSV under the session's `arch`
//! directory. To add archiving functionality to a struct implement the
//! `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
pub use csv::Writer;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as CSV.
///
/// Implementors shall hold one `Archiver` per archived item, set up in the
/// struct's `init` or `new` functions, and call `write` once per cycle.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a particular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session,
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut arch_path = session.arch_root.clone();
        arch_path.push(path);

        if let Some(parent) = arch_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create the file if it does not exist
        File::create(&arch_path)?;

        // Open the file in append mode
        let file = OpenOptions::new().append(true).open(arch_path)?;

        let writer = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Serialise a record into the archive.
    ///
    /// An archiver which was never initialised (the default) silently drops
    /// records, so module state built outside a session still works.
    pub fn serialise<T: Serialize>(
        &mut self,
        record: T,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record)?;
                w.flush()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
