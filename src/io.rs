//! Low-level file I/O for whole documents.
//!
//! Documents are read through a memory map and parsed in place, so loading a large document
//! does not copy it into a `String` first. Writes go through a `BufWriter` and are flushed
//! before returning.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::error::{JsonError, Result};

/// A document mapped into memory.
#[derive(Debug)]
pub struct MappedDocument {
    mmap: Mmap,
}

impl MappedDocument {
    /// Maps the file at `path`. Empty files are rejected, as an empty document is not JSON.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            return Err(JsonError::invalid_operation(format!(
                "empty document in {}",
                path.as_ref().display()
            )));
        }

        // Safety: the map is read-only and dropped before `load` returns; another process
        // truncating the file meanwhile is outside what we can guard against.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// The document text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.mmap).map_err(|e| {
            JsonError::invalid_operation(format!("document is not valid UTF-8: {e}"))
        })
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the document has no bytes.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// Writes `text` to `path`, replacing any existing file.
pub fn write_document<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}
