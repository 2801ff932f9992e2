use std::{fs::File, path::Path};

use cap_std::fs_utf8::Dir;
use hues_core::RespackId;
use hues_respack_models::{HueEntry, ImageEntry, MetadataKind, RespackInfo, SongEntry, XotNameIDs};
use indexmap::IndexMap;
use serde::{ser::SerializeStruct, Serialize};
use tracing::{info, info_span, instrument, trace, warn};
use xot::Xot;

use crate::{
    error::{RespackError, Result},
    io::{
        list_dir, list_zip, parse_metadata, ContainerListing, FileOpener, Metadata, RespackFile,
        ZipHandle,
    },
};

/// A loaded resource pack: what its metadata declares, with every image and song
/// already resolved, and the files of its container served by base name.
///
/// A `Respack` is immutable once loaded. It can be shared between threads, every
/// [`Respack::open`] yields an independent stream.
#[derive(Debug)]
pub struct Respack {
    pub(crate) id: RespackId,
    pub(crate) info: RespackInfo,
    pub(crate) images: Vec<ImageEntry>,
    pub(crate) songs: Vec<SongEntry>,
    pub(crate) hues: Vec<HueEntry>,
    /// base name -> opener, including the synthesized metadata documents
    pub(crate) files: IndexMap<String, FileOpener>,
    /// only zip backed packs hold a container handle
    archive: Option<ZipHandle>,
}

impl Respack {
    /// A pack without any file. Its `info.xml` is still served.
    pub fn empty(id: RespackId) -> Self {
        Self {
            id,
            info: RespackInfo::default(),
            images: Vec::new(),
            songs: Vec::new(),
            hues: Vec::new(),
            files: IndexMap::new(),
            archive: None,
        }
    }

    /// Loads the zip archive at `path` of the filesystem.
    pub fn open_zip(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display_path = path.to_string_lossy();
        let file = File::open(path).map_err(|e| RespackError::container(display_path.as_ref(), e))?;
        Self::from_zip_file(&display_path, file)
    }

    /// Loads the zip archive `path` of `root`.
    pub fn load_zip(root: &Dir, path: &str) -> Result<Self> {
        let file = root
            .open(path)
            .map_err(|e| RespackError::container(path, e))?;
        Self::from_zip_file(path, file.into_std())
    }

    /// Loads an already opened zip archive. `path` names the pack.
    #[instrument(skip(file))]
    pub fn from_zip_file(path: &str, file: File) -> Result<Self> {
        let id = RespackId::from_path(path);
        let (listing, archive) = list_zip(&id, path, file)?;
        Self::assemble(id, listing, Some(archive))
    }

    /// Loads the directory tree `path` of `root`.
    #[instrument(skip(root))]
    pub fn load_dir(root: &Dir, path: &str) -> Result<Self> {
        let id = RespackId::from_path(path);
        let dir = root
            .open_dir(path)
            .map_err(|e| RespackError::container(path, e))?;
        let listing = list_dir(dir, path)?;
        Self::assemble(id, listing, None)
    }

    /// Parses every document, then resolves. Any invalid document fails the whole pack,
    /// the archive handle is released when `archive` is dropped.
    fn assemble(
        id: RespackId,
        listing: ContainerListing,
        archive: Option<ZipHandle>,
    ) -> Result<Self> {
        let span = info_span!("respack", %id);
        let _enter = span.enter();

        let ContainerListing { documents, files } = listing;
        let mut pack = Self {
            files,
            archive,
            ..Self::empty(id)
        };
        for document in documents {
            let Some(metadata) = parse_metadata(&document.path, &document.bytes)? else {
                continue;
            };
            let kind = metadata.kind();
            // *.xml never reach the file map, so only a previous document can be there
            if pack.files.contains_key(kind.file_name()) {
                warn!(file = %document.path, %kind, "ignoring duplicate metadata document");
                continue;
            }
            trace!(file = %document.path, %kind, "metadata document");
            match metadata {
                Metadata::Info(info) => pack.info = info,
                Metadata::Images(images) => pack.images = images,
                Metadata::Songs(songs) => pack.songs = songs,
                Metadata::Hues(hues) => pack.hues = hues,
            }
            pack.files.insert(
                kind.file_name().to_owned(),
                FileOpener::Bytes(document.bytes.into()),
            );
        }
        pack.resolve_uris();

        info!(
            name = pack.name(),
            images = pack.image_count(),
            songs = pack.song_count(),
            unresolved = pack.unresolved().len(),
            "loaded respack"
        );
        Ok(pack)
    }

    pub fn id(&self) -> &RespackId {
        &self.id
    }

    /// The name declared in `info.xml`, or the id.
    pub fn name(&self) -> &str {
        self.info.display_name(self.id.as_str())
    }

    pub fn info(&self) -> &RespackInfo {
        &self.info
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn songs(&self) -> &[SongEntry] {
        &self.songs
    }

    pub fn hues(&self) -> &[HueEntry] {
        &self.hues
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Declared image, song and buildup names without a matching file.
    pub fn unresolved(&self) -> Vec<&str> {
        let images = self
            .images
            .iter()
            .filter(|image| image.uri().is_none())
            .map(ImageEntry::name);
        let songs = self
            .songs
            .iter()
            .filter(|song| song.uri().is_none())
            .map(SongEntry::name);
        let buildups = self.songs.iter().filter_map(|song| match song.buildup_uri() {
            None => song.buildup.as_deref(),
            Some(_) => None,
        });
        images
            .chain(songs)
            .chain(buildups)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Base names of every file that [`Respack::open`] can serve, `info.xml` aside.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name) || name == MetadataKind::Info.file_name()
    }

    /// Opens the file `name` of the pack. `name` is a base name, like `ball.gif` or `songs.xml`.
    ///
    /// A pack without an info document still serves `info.xml`, with the id as its name.
    pub fn open(&self, name: &str) -> Result<RespackFile> {
        if let Some(opener) = self.files.get(name) {
            return opener.open(name);
        }
        if name == MetadataKind::Info.file_name() {
            let document = self.default_info_document()?;
            return Ok(RespackFile::from_bytes(name, document.into_bytes().into()));
        }
        Err(RespackError::NotFound {
            name: name.to_owned(),
        })
    }

    fn default_info_document(&self) -> Result<String> {
        let into_error = |e: xot::Error| RespackError::metadata(MetadataKind::Info.file_name(), e);
        let mut tree = Xot::new();
        let names = XotNameIDs::register_with_xot(&mut tree);
        let info = tree.add_name(MetadataKind::Info.root_tag());

        let root = tree.new_element(info);
        let name = tree.new_element(names.name);
        let text = tree.new_text(self.id.as_str());
        tree.append(name, text).map_err(into_error)?;
        tree.append(root, name).map_err(into_error)?;
        let document = tree.new_document_with_element(root).map_err(into_error)?;
        tree.to_string(document).map_err(into_error)
    }

    /// Releases the archive of a zip backed pack. Streams already opened stay readable,
    /// opening a zip entry afterwards fails with [`RespackError::Closed`].
    /// Closing twice, or closing a directory backed pack, does nothing.
    pub fn close(&self) -> Result<()> {
        if let Some(archive) = &self.archive {
            if !archive.close() {
                trace!(id = %self.id, "respack already closed");
            }
        }
        Ok(())
    }
}

impl Serialize for Respack {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Respack", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("info", &self.info)?;
        state.serialize_field("imageCount", &self.image_count())?;
        state.serialize_field("songCount", &self.song_count())?;
        state.serialize_field("images", &self.images)?;
        state.serialize_field("songs", &self.songs)?;
        state.serialize_field("hues", &self.hues)?;
        state.end()
    }
}
