use std::{collections::HashMap, sync::Arc};

use cap_std::fs_utf8::Dir;
use hues_core::{extension, RespackId};
use itertools::Itertools;
use tracing::{error, info, instrument, trace, warn};

use crate::{
    builtin::{BuiltinRespacks, BUILTIN, BUILTIN_IMAGE},
    error::{RespackError, Result},
    Respack,
};

const ZIP_EXTENSION: &str = "zip";

fn is_reserved(id: &RespackId) -> bool {
    id.as_str() == BUILTIN || id.as_str() == BUILTIN_IMAGE
}

/// Every respack known to the player.
///
/// The packs found in the respacks directory are listed, sorted by id. The builtin
/// packs can be looked up like the others but are never listed nor searched.
#[derive(Debug, Default)]
pub struct RespackCollection {
    listed: Vec<Arc<Respack>>,
    by_id: HashMap<RespackId, Arc<Respack>>,
}

impl RespackCollection {
    /// Loads every zip archive and directory of `dir`, in name order.
    /// A pack that fails to load is logged and left out, the others are still loaded.
    /// When two entries give the same id (`Disco/` and `Disco.zip`), the first by name wins.
    #[instrument(skip(dir))]
    pub fn load_dir(dir: &Dir) -> Result<Self> {
        let mut collection = Self::default();
        let mut entries = Vec::new();
        for entry in dir
            .entries()
            .map_err(|e| RespackError::container(".", e))?
        {
            let entry = entry.map_err(|e| RespackError::container(".", e))?;
            let name = match entry.file_name() {
                Ok(name) => name,
                Err(e) => {
                    warn!("skipping respack without a utf-8 name: {e}");
                    continue;
                }
            };
            let is_dir = entry
                .file_type()
                .map_err(|e| RespackError::container(&name, e))?
                .is_dir();
            entries.push((name, is_dir));
        }
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (name, is_dir) in entries {
            let is_zip = !is_dir
                && extension(&name).is_some_and(|ext| ext.eq_ignore_ascii_case(ZIP_EXTENSION));
            if !is_dir && !is_zip {
                trace!(%name, "not a respack");
                continue;
            }
            if is_reserved(&RespackId::from_path(&name)) {
                warn!(%name, "skipping respack with a builtin id");
                continue;
            }
            let loaded = if is_dir {
                Respack::load_dir(dir, &name)
            } else {
                Respack::load_zip(dir, &name)
            };
            match loaded {
                Ok(pack) => collection.insert(Arc::new(pack)),
                Err(e) => error!(%name, "failed to load respack: {e:?}"),
            }
        }
        info!(respacks = collection.len(), "respacks loaded");
        Ok(collection)
    }

    /// Adds a listed pack. A pack whose id is already taken, or is a builtin id, is dropped.
    pub fn insert(&mut self, pack: Arc<Respack>) {
        if is_reserved(pack.id()) {
            warn!(id = %pack.id(), "builtin ids are reserved");
            return;
        }
        if self.by_id.contains_key(pack.id()) {
            warn!(id = %pack.id(), "a respack with the same id is already loaded");
            return;
        }
        self.by_id.insert(pack.id().clone(), Arc::clone(&pack));
        let position = self
            .listed
            .partition_point(|listed| listed.id() < pack.id());
        self.listed.insert(position, pack);
    }

    /// Makes the builtin packs reachable by id, without listing them.
    pub fn insert_builtin(&mut self, builtin: &BuiltinRespacks) {
        for pack in [&builtin.builtin, &builtin.builtin_image] {
            let replaced = self.by_id.insert(pack.id().clone(), Arc::clone(pack));
            if replaced.is_some_and(|replaced| !Arc::ptr_eq(&replaced, pack)) {
                warn!(id = %pack.id(), "builtin respack replaced");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Respack>> {
        self.by_id.get(id)
    }

    /// Listed packs, by id.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Respack>> {
        self.listed.iter()
    }

    pub fn len(&self) -> usize {
        self.listed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listed.is_empty()
    }

    /// Listed packs declaring an image or a song whose name or title contains `query`,
    /// ignoring case. An empty query matches every pack.
    pub fn search(&self, query: &str) -> Vec<&Arc<Respack>> {
        if query.is_empty() {
            return self.listed.iter().collect();
        }
        let query = query.to_lowercase();
        let matches = |text: &str| text.to_lowercase().contains(&query);
        self.listed
            .iter()
            .filter(|pack| {
                pack.images().iter().any(|image| {
                    matches(image.name()) || image.full_name.as_deref().is_some_and(matches)
                }) || pack.songs().iter().any(|song| {
                    matches(song.name()) || song.title.as_deref().is_some_and(matches)
                })
            })
            .collect()
    }

    /// Total number of images of the packs `ids`.
    pub fn image_count<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        ids.into_iter().try_fold(0, |total, id| {
            let pack = self.get(id).ok_or_else(|| RespackError::NotFound {
                name: id.to_owned(),
            })?;
            Ok(total + pack.image_count())
        })
    }

    /// The packs the player should load for `ids`: `ids` themselves, followed by the
    /// builtin image pack when none of them has an image.
    pub fn player_respacks<'a>(&self, ids: &[&'a str]) -> Result<Vec<&'a str>> {
        let mut respacks = ids.to_vec();
        if self.image_count(ids.iter().copied())? == 0 {
            respacks.push(BUILTIN_IMAGE);
        }
        Ok(respacks)
    }

    /// Names of the listed packs, for logs.
    pub fn ids(&self) -> String {
        self.listed.iter().map(|pack| pack.id()).join(", ")
    }
}
