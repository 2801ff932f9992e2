use cap_std::{
    ambient_authority,
    fs_utf8::{camino::Utf8PathBuf, Dir},
};
use miette::{Context, IntoDiagnostic, Result};

/// Hues data directory.
/// We read a path from env `HUES_DATA_DIR`, or use the current directory.
/// It holds `respacks/`, `assets/builtin`, `assets/builtin_image` and the log file.
pub const DATA_DIR_ENV: &str = "HUES_DATA_DIR";
pub const RESPACKS_DIR: &str = "respacks";

pub fn get_hues_dir() -> Result<Dir> {
    let authority = ambient_authority();
    let path = match std::env::var(DATA_DIR_ENV) {
        Ok(env_dir) => Utf8PathBuf::from(env_dir),
        Err(_) => Utf8PathBuf::from("."),
    };
    Dir::open_ambient_dir(&path, authority)
        .into_diagnostic()
        .wrap_err(path)
        .wrap_err("failed to open hues data dir")
}

pub fn get_respacks_dir(hues_dir: &Dir) -> Result<Dir> {
    hues_dir
        .open_dir(RESPACKS_DIR)
        .into_diagnostic()
        .wrap_err("failed to open respacks dir")
}
