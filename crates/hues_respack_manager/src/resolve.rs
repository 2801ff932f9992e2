//! Maps the names declared in `images.xml` and `songs.xml` to files of the pack.

use hues_core::{ResourceKind, RespackId};
use indexmap::IndexMap;
use tracing::debug;

use crate::{io::FileOpener, Respack};

/// `<id>/<file name>` of the first candidate file present in `files`, `None` when
/// the name is empty or nothing matches.
fn resolve(
    id: &RespackId,
    files: &IndexMap<String, FileOpener>,
    name: &str,
    kind: ResourceKind,
) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let found = kind
        .candidates(name)
        .find(|candidate| files.contains_key(candidate.as_str()));
    if found.is_none() {
        debug!(%id, name, ?kind, "unresolved");
    }
    found.map(|file_name| id.uri_for(&file_name))
}

impl Respack {
    pub fn resolve_image_uri(&self, name: &str) -> Option<String> {
        resolve(&self.id, &self.files, name, ResourceKind::Image)
    }

    pub fn resolve_song_uri(&self, name: &str) -> Option<String> {
        resolve(&self.id, &self.files, name, ResourceKind::Song)
    }

    /// Writes the uri of every image and song. Only reads the declared names,
    /// so running it again gives the same result.
    pub(crate) fn resolve_uris(&mut self) {
        let Respack {
            id,
            files,
            images,
            songs,
            ..
        } = self;
        for image in images.iter_mut() {
            let uri = resolve(id, files, image.name(), ResourceKind::Image);
            image.set_uri(uri);
        }
        for song in songs.iter_mut() {
            let uri = resolve(id, files, song.name(), ResourceKind::Song);
            let buildup_uri = song
                .buildup
                .as_deref()
                .and_then(|buildup| resolve(id, files, buildup, ResourceKind::Song));
            song.set_uris(uri, buildup_uri);
        }
    }
}
