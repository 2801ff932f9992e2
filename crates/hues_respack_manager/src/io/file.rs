use std::{
    io::{Cursor, Read, Seek, SeekFrom},
    sync::Arc,
};

use cap_std::fs_utf8::{Dir, File};

use super::archive::{ZipEntry, ZipEntryReader, ZipHandle};
use crate::error::{RespackError, Result};

/// Reopens one file of a respack on demand.
/// Each opener is bound to its own entry, nothing is shared between two openers
/// except the container handle.
#[derive(Debug, Clone)]
pub(crate) enum FileOpener {
    /// one member of a zip archive
    Zip { archive: ZipHandle, entry: ZipEntry },
    /// file `file_name` of one directory of the tree
    Dir { dir: Arc<Dir>, file_name: String },
    /// a metadata document kept in memory after parsing
    Bytes(Arc<[u8]>),
}

impl FileOpener {
    pub(crate) fn open(&self, name: &str) -> Result<RespackFile> {
        match self {
            FileOpener::Zip { archive, entry } => {
                let reader = archive.open_entry(*entry)?;
                Ok(RespackFile {
                    name: name.to_owned(),
                    len: reader.len(),
                    inner: FileInner::Zip(reader),
                })
            }
            FileOpener::Dir { dir, file_name } => {
                let read_error = |source| RespackError::Read {
                    name: name.to_owned(),
                    source,
                };
                let file = dir.open(file_name).map_err(read_error)?;
                let len = file.metadata().map_err(read_error)?.len();
                Ok(RespackFile {
                    name: name.to_owned(),
                    len,
                    inner: FileInner::Disk(file),
                })
            }
            FileOpener::Bytes(bytes) => Ok(RespackFile::from_bytes(name, Arc::clone(bytes))),
        }
    }
}

#[derive(Debug)]
enum FileInner {
    Memory(Cursor<Arc<[u8]>>),
    Disk(File),
    Zip(ZipEntryReader),
}

/// A readable, seekable stream over one file of a respack, positioned at its start.
/// It is owned by whoever opened it and is closed when dropped.
#[derive(Debug)]
pub struct RespackFile {
    name: String,
    len: u64,
    inner: FileInner,
}

impl RespackFile {
    pub(crate) fn from_bytes(name: &str, bytes: Arc<[u8]>) -> Self {
        Self {
            name: name.to_owned(),
            len: bytes.len() as u64,
            inner: FileInner::Memory(Cursor::new(bytes)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// size in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for RespackFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            FileInner::Memory(cursor) => cursor.read(buf),
            FileInner::Disk(file) => file.read(buf),
            FileInner::Zip(reader) => reader.read(buf),
        }
    }
}

impl Seek for RespackFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match &mut self.inner {
            FileInner::Memory(cursor) => cursor.seek(pos),
            FileInner::Disk(file) => file.seek(pos),
            FileInner::Zip(reader) => reader.seek(pos),
        }
    }
}
