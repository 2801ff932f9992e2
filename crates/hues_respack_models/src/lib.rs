//! Data model of a respack: what its metadata documents declare.
//!
//! Nothing in here touches a container. The loader fills these structures and
//! writes the resolved uris once every document of a pack has been parsed.

pub mod hue;
pub mod image;
pub mod info;
pub mod metadata;
pub mod song;

pub use hue::HueEntry;
pub use image::ImageEntry;
pub use info::RespackInfo;
pub use metadata::{MetadataKind, XotNameIDs};
pub use song::SongEntry;

/// Unresolved uris are rendered as an empty string, the way the player expects them.
pub(crate) fn serialize_uri<S>(uri: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(uri.as_deref().unwrap_or_default())
}
