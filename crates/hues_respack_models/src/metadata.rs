use xot::{NameId, Xot};

/// The metadata documents a respack may carry.
/// A document is classified by the tag of its top-level element, ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKind {
    Info,
    Images,
    Songs,
    Hues,
}

impl MetadataKind {
    pub const ALL: [MetadataKind; 4] = [
        MetadataKind::Info,
        MetadataKind::Images,
        MetadataKind::Songs,
        MetadataKind::Hues,
    ];

    /// `None` for documents this loader does not know about.
    pub fn from_root_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.root_tag().eq_ignore_ascii_case(tag))
    }

    pub fn root_tag(self) -> &'static str {
        match self {
            MetadataKind::Info => "info",
            MetadataKind::Images => "images",
            MetadataKind::Songs => "songs",
            MetadataKind::Hues => "hues",
        }
    }

    /// name under which the raw document is served back by the respack
    pub fn file_name(self) -> &'static str {
        match self {
            MetadataKind::Info => "info.xml",
            MetadataKind::Images => "images.xml",
            MetadataKind::Songs => "songs.xml",
            MetadataKind::Hues => "hues.xml",
        }
    }
}

impl std::fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root_tag())
    }
}

/// Interned names of every element and attribute of the respack schema.
/// The spelling is load-bearing: existing packs were authored against it,
/// `rythm` included.
#[derive(Debug, Clone, Copy)]
pub struct XotNameIDs {
    pub name: NameId,
    pub author: NameId,
    pub description: NameId,
    pub link: NameId,

    pub image: NameId,
    pub full_name: NameId,
    pub center_pixel: NameId,
    pub align: NameId,
    pub frame_duration: NameId,
    pub beats_per_anim: NameId,

    pub song: NameId,
    pub title: NameId,
    pub rhythm: NameId,
    pub buildup: NameId,
    pub buildup_rhythm: NameId,
    pub chars_per_beat: NameId,

    pub hue: NameId,
}

impl XotNameIDs {
    pub fn register_with_xot(tree: &mut Xot) -> Self {
        Self {
            name: tree.add_name("name"),
            author: tree.add_name("author"),
            description: tree.add_name("description"),
            link: tree.add_name("link"),

            image: tree.add_name("image"),
            full_name: tree.add_name("fullname"),
            center_pixel: tree.add_name("centerPixel"),
            align: tree.add_name("align"),
            frame_duration: tree.add_name("frameDuration"),
            beats_per_anim: tree.add_name("beatsPerAnim"),

            song: tree.add_name("song"),
            title: tree.add_name("title"),
            rhythm: tree.add_name("rythm"),
            buildup: tree.add_name("buildup"),
            buildup_rhythm: tree.add_name("buildupRhythm"),
            chars_per_beat: tree.add_name("charsPerBeat"),

            hue: tree.add_name("hue"),
        }
    }
}
