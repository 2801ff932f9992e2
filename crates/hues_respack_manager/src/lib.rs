//! Loads Hues resource packs.
//!
//! A respack is a zip archive or a directory tree holding images, songs and up to four
//! xml metadata documents (`info`, `images`, `songs`, `hues`). Loading a pack lists its
//! container, parses the documents, then resolves every declared image and song to a
//! file of the pack. The loaded [`Respack`] serves its files by base name, whatever the
//! container they come from.

pub mod builtin;
mod collection;
mod error;
mod io;
mod resolve;
mod respack;

pub use builtin::{builtin_respacks, BuiltinRespacks};
pub use collection::RespackCollection;
pub use error::{ContainerSource, RespackError, Result};
pub use io::RespackFile;
pub use respack::Respack;

pub use hues_core::RespackId;
pub use hues_respack_models as models;
