//! Naming conventions used by respack authors for the files declared in metadata.

pub const METADATA_EXTENSION: &str = "xml";

/// Order matters: the first candidate present in a pack wins.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".gif"];
/// Animations are declared by their base name but stored as numbered frames.
pub const IMAGE_FRAME_SUFFIXES: [&str; 4] = ["", "_1", "_01", "_001"];
/// Smaller encodings first.
pub const SONG_EXTENSIONS: [&str; 3] = [".opus", ".ogg", ".mp3"];
const SONG_SUFFIXES: [&str; 1] = [""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Song,
}

impl ResourceKind {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Image => &IMAGE_EXTENSIONS,
            ResourceKind::Song => &SONG_EXTENSIONS,
        }
    }

    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Image => &IMAGE_FRAME_SUFFIXES,
            ResourceKind::Song => &SONG_SUFFIXES,
        }
    }

    /// Every file name that may hold the resource declared as `name`, most preferred first.
    /// Suffixes vary slowest: `foo.gif` is preferred over `foo_1.png`.
    pub fn candidates(self, name: &str) -> impl Iterator<Item = String> + '_ {
        self.suffixes().iter().flat_map(move |suffix| {
            self.extensions()
                .iter()
                .map(move |ext| format!("{name}{suffix}{ext}"))
        })
    }
}
