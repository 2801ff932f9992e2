mod init;
mod trace;

use cap_std::fs_utf8::Dir;
use hues_respack_manager::{builtin_respacks, RespackCollection};
use miette::{IntoDiagnostic, Result};
use tracing::{error, info, info_span};

use self::init::{get_hues_dir, get_respacks_dir};
use self::trace::install_tracing;

pub fn start_hues() {
    let hues_dir = match get_hues_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("failed to open hues dir: {e:?}");
            std::process::exit(1);
        }
    };

    let log_file_flush_guard = match install_tracing(&hues_dir) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to install tracing: {e:?}");
            std::process::exit(1);
        }
    };

    let status = match list_respacks(&hues_dir) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:?}");
            1
        }
    };
    std::mem::drop(log_file_flush_guard);
    std::process::exit(status);
}

/// Loads every pack of the data dir and prints them as json on stdout.
fn list_respacks(hues_dir: &Dir) -> Result<()> {
    let _span = info_span!("list respacks").entered();

    let builtin = builtin_respacks(hues_dir);
    let respacks_dir = get_respacks_dir(hues_dir)?;
    let mut collection = RespackCollection::load_dir(&respacks_dir)?;
    collection.insert_builtin(builtin);
    info!("Respacks: [{}]", collection.ids());

    for pack in collection.iter() {
        let unresolved = pack.unresolved();
        if !unresolved.is_empty() {
            info!(id = %pack.id(), ?unresolved, "unresolved resources");
        }
    }

    let listing: Vec<_> = collection
        .iter()
        .chain([&builtin.builtin, &builtin.builtin_image])
        .map(|pack| pack.as_ref())
        .collect();
    let json = serde_json::to_string_pretty(&listing).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
