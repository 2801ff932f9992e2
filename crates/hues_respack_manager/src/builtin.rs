//! The packs shipped with the player, loaded once per process.

use std::sync::{Arc, OnceLock};

use cap_std::fs_utf8::Dir;
use hues_core::RespackId;
use tracing::warn;

use crate::Respack;

/// Default songs of the player.
pub const BUILTIN: &str = "builtin";
/// Default images, added to a selection of packs without any image.
pub const BUILTIN_IMAGE: &str = "builtin_image";

const ASSETS_DIR: &str = "assets";

static BUILTIN_RESPACKS: OnceLock<BuiltinRespacks> = OnceLock::new();

#[derive(Debug)]
pub struct BuiltinRespacks {
    pub builtin: Arc<Respack>,
    pub builtin_image: Arc<Respack>,
}

impl BuiltinRespacks {
    /// Loads `builtin` and `builtin_image` from `assets`. A pack that can't be loaded
    /// is replaced by an empty pack with the same id.
    pub fn load(assets: Option<&Dir>) -> Self {
        Self {
            builtin: Arc::new(load_or_empty(assets, BUILTIN)),
            builtin_image: Arc::new(load_or_empty(assets, BUILTIN_IMAGE)),
        }
    }
}

fn load_or_empty(assets: Option<&Dir>, name: &str) -> Respack {
    let loaded = match assets {
        Some(assets) => Respack::load_dir(assets, name),
        None => return Respack::empty(RespackId::from_path(name)),
    };
    loaded.unwrap_or_else(|e| {
        warn!(name, "builtin respack replaced by an empty pack: {e:?}");
        Respack::empty(RespackId::from_path(name))
    })
}

/// The builtin packs found in `<data_dir>/assets`. Only the first call reads `data_dir`.
pub fn builtin_respacks(data_dir: &Dir) -> &'static BuiltinRespacks {
    BUILTIN_RESPACKS.get_or_init(|| {
        let assets = data_dir
            .open_dir(ASSETS_DIR)
            .map_err(|e| warn!("no assets directory: {e}"))
            .ok();
        BuiltinRespacks::load(assets.as_ref())
    })
}
