//! This module deals with reading respack containers: zip archives and directory trees.
//!
//! Both containers are reduced to the same listing: the raw metadata documents,
//! and one lazy opener per remaining file, keyed by its base name.

mod archive;
mod deserialize;
mod dir;
mod file;

use indexmap::IndexMap;
use tracing::trace;

pub(crate) use archive::{list_zip, ZipHandle};
pub(crate) use deserialize::{parse_metadata, Metadata};
pub(crate) use dir::list_dir;
pub(crate) use file::FileOpener;
pub use file::RespackFile;

/// A `.xml` file found in the container, read eagerly since it has to be parsed anyway.
#[derive(Debug)]
pub(crate) struct MetadataDocument {
    /// path inside the container, for error reporting
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct ContainerListing {
    pub documents: Vec<MetadataDocument>,
    pub files: IndexMap<String, FileOpener>,
}

impl ContainerListing {
    fn insert_file(&mut self, name: String, opener: FileOpener) {
        if self.files.insert(name.clone(), opener).is_some() {
            trace!(%name, "entry shadowed by a later entry with the same base name");
        }
    }
}
