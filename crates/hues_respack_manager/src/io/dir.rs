use std::sync::Arc;

use cap_std::fs_utf8::Dir;
use hues_core::is_metadata_file;
use tracing::{instrument, trace, warn};

use super::{ContainerListing, FileOpener, MetadataDocument};
use crate::error::{RespackError, Result};

/// Lists a directory tree. Every subdirectory is visited, files are keyed by their
/// own name whatever their depth. `path` is only used to report errors.
#[instrument(skip(dir))]
pub(crate) fn list_dir(dir: Dir, path: &str) -> Result<ContainerListing> {
    let mut listing = ContainerListing::default();
    recursive_walk_dir(Arc::new(dir), path, &mut listing)?;
    Ok(listing)
}

fn recursive_walk_dir(dir: Arc<Dir>, dir_path: &str, listing: &mut ContainerListing) -> Result<()> {
    let mut entries = Vec::new();
    for entry in dir
        .entries()
        .map_err(|e| RespackError::container(dir_path, e))?
    {
        let entry = entry.map_err(|e| RespackError::container(dir_path, e))?;
        match entry.file_name() {
            Ok(name) => entries.push((name, entry)),
            Err(e) => warn!(dir_path, "skipping entry without a utf-8 name: {e}"),
        }
    }
    // read_dir order is platform dependent
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, entry) in entries {
        let entry_path = format!("{dir_path}/{name}");
        let file_type = entry
            .file_type()
            .map_err(|e| RespackError::container(&entry_path, e))?;
        if file_type.is_dir() {
            let sub_dir = entry
                .open_dir()
                .map_err(|e| RespackError::container(&entry_path, e))?;
            recursive_walk_dir(Arc::new(sub_dir), &entry_path, listing)?;
        } else if is_metadata_file(&name) {
            let bytes = dir
                .read(&name)
                .map_err(|e| RespackError::metadata(&entry_path, e))?;
            listing.documents.push(MetadataDocument {
                path: entry_path,
                bytes,
            });
        } else {
            trace!(%entry_path, "asset");
            listing.insert_file(
                name.clone(),
                FileOpener::Dir {
                    dir: Arc::clone(&dir),
                    file_name: name,
                },
            );
        }
    }
    Ok(())
}
