use serde::Serialize;

use crate::serialize_uri;

/// One `<image name="…">` declaration of `images.xml`.
///
/// `name` is the key used to find the image file and is never changed after parsing.
/// `uri` stays `None` until the image has been resolved against the files of the pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    name: String,
    pub full_name: Option<String>,
    pub center_pixel: Option<i32>,
    pub align: Option<String>,
    pub frame_duration: Option<i32>,
    pub beats_per_anim: Option<i32>,
    #[serde(serialize_with = "serialize_uri")]
    uri: Option<String>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<pack id>/<file name>` once resolved
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.uri.is_some()
    }

    /// Written by the resolution pass of the loader.
    pub fn set_uri(&mut self, uri: Option<String>) {
        self.uri = uri;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_serialize_unresolved_as_empty() {
        let mut image = ImageEntry::new("ball");
        image.center_pixel = Some(12);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["name"], "ball");
        assert_eq!(json["centerPixel"], 12);
        assert_eq!(json["uri"], "");

        image.set_uri(Some("Disco/ball.gif".to_string()));
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["uri"], "Disco/ball.gif");
        assert!(image.is_resolved());
    }
}
