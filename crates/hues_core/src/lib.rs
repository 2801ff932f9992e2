use std::{borrow::Borrow, str::FromStr};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub mod resource;

pub use resource::ResourceKind;

/// Slug identifying a respack, derived once from the container's file name.
/// 1. It is the base name of the container path without its final extension.
/// 2. Spaces are replaced by underscores so the id can be used as an url segment.
/// 3. It never changes after the respack is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RespackId(SmolStr);

impl Serialize for RespackId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}
impl<'de> Deserialize<'de> for RespackId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_path(&s))
    }
}

impl RespackId {
    /// `"respacks/My Pack.zip"` becomes `My_Pack`, `"assets/builtin"` becomes `builtin`.
    pub fn from_path(path: &str) -> Self {
        let basename = base_name(path);
        let stem = match basename.rfind('.') {
            Some(index) => &basename[..index],
            None => basename,
        };
        Self(stem.replace(' ', "_").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// public path of a file of this respack, `<id>/<file_name>`
    pub fn uri_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.0, file_name)
    }
}

impl std::fmt::Display for RespackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lets maps keyed by id be queried with the `&str` taken from an url.
impl Borrow<str> for RespackId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<RespackId> for String {
    fn from(val: RespackId) -> String {
        val.0.into()
    }
}
impl FromStr for RespackId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_path(s))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Last component of a container path. Archives written on windows may use `\`.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Extension of the base name, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let basename = base_name(path);
    basename.rfind('.').map(|index| &basename[index + 1..])
}

pub fn is_metadata_file(path: &str) -> bool {
    extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case(resource::METADATA_EXTENSION))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Disco.zip", "Disco")]
    #[case("respacks/My Pack.zip", "My_Pack")]
    #[case("assets/builtin", "builtin")]
    #[case("assets/builtin_image/", "builtin_image")]
    #[case("C:\\packs\\Old School.v2.zip", "Old_School.v2")]
    fn test_id_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(RespackId::from_path(path).as_str(), expected);
    }

    #[rstest]
    #[case("kick.ogg", "kick.ogg")]
    #[case("extra/kick.ogg", "kick.ogg")]
    #[case("pack/extra/deep/kick.ogg", "kick.ogg")]
    #[case("pack\\images\\ball.gif", "ball.gif")]
    #[case("images/", "images")]
    fn test_base_name(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(base_name(path), expected);
    }

    #[test]
    fn test_metadata_detection() {
        assert!(is_metadata_file("info.xml"));
        assert!(is_metadata_file("Pack/Songs.XML"));
        assert!(!is_metadata_file("ball.gif"));
        assert!(!is_metadata_file("xml"));
        assert!(!is_metadata_file("folder.xml/ball.gif"));
    }

    #[test]
    fn test_uri_and_serde() {
        let id = RespackId::from_path("Disco Night.zip");
        assert_eq!(id.uri_for("ball.gif"), "Disco_Night/ball.gif");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Disco_Night\"");
        let back: RespackId = serde_json::from_str("\"Disco_Night\"").unwrap();
        assert_eq!(back, id);
    }
}
