use serde::Serialize;

use crate::serialize_uri;

/// One `<song name="…">` declaration of `songs.xml`.
///
/// A song may declare a buildup played before its loop. Both are resolved
/// independently: either uri can be missing while the other is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntry {
    name: String,
    pub title: Option<String>,
    pub rhythm: String,
    pub buildup: Option<String>,
    pub buildup_rhythm: Option<String>,
    pub chars_per_beat: Option<i32>,
    #[serde(serialize_with = "serialize_uri")]
    uri: Option<String>,
    #[serde(serialize_with = "serialize_uri")]
    buildup_uri: Option<String>,
}

impl SongEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn buildup_uri(&self) -> Option<&str> {
        self.buildup_uri.as_deref()
    }

    /// Written by the resolution pass of the loader.
    pub fn set_uris(&mut self, uri: Option<String>, buildup_uri: Option<String>) {
        self.uri = uri;
        self.buildup_uri = buildup_uri;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_buildup_resolved_independently() {
        let mut song = SongEntry::new("tune");
        song.buildup = Some("intro".to_string());
        song.set_uris(Some("Disco/tune.ogg".to_string()), None);
        assert_eq!(song.uri(), Some("Disco/tune.ogg"));
        assert_eq!(song.buildup_uri(), None);

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["buildup"], "intro");
        assert_eq!(json["buildupUri"], "");
        assert_eq!(json["uri"], "Disco/tune.ogg");
    }
}
