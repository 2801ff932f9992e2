use std::borrow::Cow;

use hues_respack_models::{
    HueEntry, ImageEntry, MetadataKind, RespackInfo, SongEntry, XotNameIDs,
};
use tracing::debug;
use xot::{NameId, Node, Xot};

use crate::error::{RespackError, Result};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// The content of one recognised metadata document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Metadata {
    Info(RespackInfo),
    Images(Vec<ImageEntry>),
    Songs(Vec<SongEntry>),
    Hues(Vec<HueEntry>),
}

impl Metadata {
    pub(crate) fn kind(&self) -> MetadataKind {
        match self {
            Metadata::Info(_) => MetadataKind::Info,
            Metadata::Images(_) => MetadataKind::Images,
            Metadata::Songs(_) => MetadataKind::Songs,
            Metadata::Hues(_) => MetadataKind::Hues,
        }
    }
}

/// Parses the document `file` of a container.
///
/// Returns `Ok(None)` for a well formed document whose top-level element is not one of
/// `info`, `images`, `songs` or `hues`. Anything that is not well formed xml,
/// or has no top-level element at all, is an error.
pub(crate) fn parse_metadata(file: &str, bytes: &[u8]) -> Result<Option<Metadata>> {
    let text = std::str::from_utf8(bytes).map_err(|e| RespackError::metadata(file, e))?;
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    // xot refuses document type declarations, packs declaring one are still valid
    let text = without_doctype(text);

    let mut tree = Xot::new();
    let names = XotNameIDs::register_with_xot(&mut tree);
    let root_node = tree
        .parse(&text)
        .map_err(|e| RespackError::metadata(file, e))?;
    let root = tree
        .document_element(root_node)
        .map_err(|e| RespackError::metadata(file, e))?;
    let tag = match tree.element(root) {
        Some(element) => tree.local_name_str(element.name()),
        None => return Err(RespackError::metadata(file, "no top-level element")),
    };
    let Some(kind) = MetadataKind::from_root_tag(tag) else {
        debug!(file, tag, "ignoring unknown metadata document");
        return Ok(None);
    };

    let reader = DocumentReader {
        tree: &tree,
        names: &names,
        file,
    };
    let metadata = match kind {
        MetadataKind::Info => Metadata::Info(reader.info(root)),
        MetadataKind::Images => Metadata::Images(reader.images(root)?),
        MetadataKind::Songs => Metadata::Songs(reader.songs(root)?),
        MetadataKind::Hues => Metadata::Hues(reader.hues(root)),
    };
    Ok(Some(metadata))
}

/// Removes the `<!DOCTYPE ..>` declaration of the prolog, internal subset included.
/// Anything else, malformed prologs too, is left for the parser.
fn without_doctype(text: &str) -> Cow<'_, str> {
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        let skipped = if rest.starts_with("<?") {
            rest.find("?>").map(|end| end + 2)
        } else if rest.starts_with("<!--") {
            rest.find("-->").map(|end| end + 3)
        } else {
            break;
        };
        match skipped {
            Some(len) => rest = &rest[len..],
            None => return Cow::Borrowed(text),
        }
    }
    if !rest.starts_with("<!DOCTYPE") {
        return Cow::Borrowed(text);
    }

    let start = text.len() - rest.len();
    let mut depth = 0usize;
    let mut quote = None;
    for (offset, c) in rest.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => {
                let end = start + offset + 1;
                return Cow::Owned(format!("{}{}", &text[..start], &text[end..]));
            }
            _ => {}
        }
    }
    Cow::Borrowed(text)
}

struct DocumentReader<'a> {
    tree: &'a Xot,
    names: &'a XotNameIDs,
    file: &'a str,
}

impl<'a> DocumentReader<'a> {
    fn info(&self, root: Node) -> RespackInfo {
        RespackInfo {
            name: self.child_text(root, self.names.name),
            author: self.child_text(root, self.names.author),
            description: self.child_text(root, self.names.description),
            link: self.child_text(root, self.names.link),
        }
    }

    fn images(&self, root: Node) -> Result<Vec<ImageEntry>> {
        self.children_named(root, self.names.image)
            .map(|node| {
                let mut image = ImageEntry::new(self.attribute(node, self.names.name));
                image.full_name = self.child_text(node, self.names.full_name);
                image.center_pixel = self.child_int(node, self.names.center_pixel)?;
                image.align = self.child_text(node, self.names.align);
                image.frame_duration = self.child_int(node, self.names.frame_duration)?;
                image.beats_per_anim = self.child_int(node, self.names.beats_per_anim)?;
                Ok(image)
            })
            .collect()
    }

    fn songs(&self, root: Node) -> Result<Vec<SongEntry>> {
        self.children_named(root, self.names.song)
            .map(|node| {
                let mut song = SongEntry::new(self.attribute(node, self.names.name));
                song.title = self.child_text(node, self.names.title);
                song.rhythm = self
                    .child_text(node, self.names.rhythm)
                    .unwrap_or_default();
                song.buildup = self.child_text(node, self.names.buildup);
                song.buildup_rhythm = self.child_text(node, self.names.buildup_rhythm);
                song.chars_per_beat = self.child_int(node, self.names.chars_per_beat)?;
                Ok(song)
            })
            .collect()
    }

    fn hues(&self, root: Node) -> Vec<HueEntry> {
        self.children_named(root, self.names.hue)
            .map(|node| HueEntry {
                name: self.attribute(node, self.names.name).to_owned(),
                color: self.tree.string_value(node).trim().to_owned(),
            })
            .collect()
    }

    fn children_named(&self, parent: Node, name: NameId) -> impl Iterator<Item = Node> + 'a {
        let tree = self.tree;
        tree.children(parent).filter(move |&node| {
            tree.element(node)
                .is_some_and(|element| element.name() == name)
        })
    }

    fn attribute(&self, node: Node, name: NameId) -> &'a str {
        self.tree.get_attribute(node, name).unwrap_or_default()
    }

    /// Trimmed text of the last `name` child. Empty text counts as absent.
    fn child_text(&self, parent: Node, name: NameId) -> Option<String> {
        let node = self.children_named(parent, name).last()?;
        let text = self.tree.string_value(node);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    }

    /// An element present with empty text reads as 0.
    fn child_int(&self, parent: Node, name: NameId) -> Result<Option<i32>> {
        let Some(node) = self.children_named(parent, name).last() else {
            return Ok(None);
        };
        let text = self.tree.string_value(node);
        let text = text.trim();
        if text.is_empty() {
            return Ok(Some(0));
        }
        text.parse::<i32>().map(Some).map_err(|e| {
            RespackError::metadata(
                self.file,
                format!("<{}> {text:?}: {e}", self.tree.local_name_str(name)),
            )
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use similar_asserts::assert_eq;

    fn parse(xml: &str) -> Result<Option<Metadata>> {
        parse_metadata("test.xml", xml.as_bytes())
    }

    #[test]
    fn test_info() {
        let metadata = parse(
            "<info>\n  <name> Disco </name>\n  <author>DJ</author>\n  <description/>\n</info>",
        )
        .unwrap();
        assert_eq!(
            metadata,
            Some(Metadata::Info(RespackInfo {
                name: Some("Disco".to_string()),
                author: Some("DJ".to_string()),
                description: None,
                link: None,
            }))
        );
    }

    #[test]
    fn test_images() {
        let Some(Metadata::Images(images)) = parse(
            r#"<images>
                <image name="ball">
                    <fullname>Disco Ball</fullname>
                    <centerPixel> 42 </centerPixel>
                    <align>left</align>
                    <frameDuration></frameDuration>
                    <unknown>ignored</unknown>
                </image>
                <image name="floor"/>
            </images>"#,
        )
        .unwrap() else {
            panic!("expected images");
        };
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name(), "ball");
        assert_eq!(images[0].full_name.as_deref(), Some("Disco Ball"));
        assert_eq!(images[0].center_pixel, Some(42));
        assert_eq!(images[0].align.as_deref(), Some("left"));
        assert_eq!(images[0].frame_duration, Some(0));
        assert_eq!(images[0].beats_per_anim, None);
        assert_eq!(images[1], ImageEntry::new("floor"));
    }

    #[test]
    fn test_songs_keep_rythm_spelling() {
        let Some(Metadata::Songs(songs)) = parse(
            r#"<songs>
                <song name="tune">
                    <title>Tune</title>
                    <rythm>x...o...</rythm>
                    <rhythm>ignored</rhythm>
                    <buildup>intro</buildup>
                    <buildupRhythm>..x.</buildupRhythm>
                    <charsPerBeat>4</charsPerBeat>
                </song>
            </songs>"#,
        )
        .unwrap() else {
            panic!("expected songs");
        };
        assert_eq!(songs.len(), 1);
        let song = &songs[0];
        assert_eq!(song.name(), "tune");
        assert_eq!(song.title.as_deref(), Some("Tune"));
        assert_eq!(song.rhythm, "x...o...");
        assert_eq!(song.buildup.as_deref(), Some("intro"));
        assert_eq!(song.buildup_rhythm.as_deref(), Some("..x."));
        assert_eq!(song.chars_per_beat, Some(4));
        assert_eq!(song.uri(), None);
    }

    #[test]
    fn test_hues() {
        let metadata = parse(r#"<hues><hue name="Black"> #000000 </hue><hue name="White">#FFFFFF</hue></hues>"#)
            .unwrap();
        assert_eq!(
            metadata,
            Some(Metadata::Hues(vec![
                HueEntry {
                    name: "Black".to_string(),
                    color: "#000000".to_string(),
                },
                HueEntry {
                    name: "White".to_string(),
                    color: "#FFFFFF".to_string(),
                },
            ]))
        );
    }

    #[rstest]
    #[case("<INFO><name>Disco</name></INFO>", Some(MetadataKind::Info))]
    #[case("\u{feff}<Songs/>", Some(MetadataKind::Songs))]
    #[case("<?xml version=\"1.0\"?>\n<!-- pack -->\n<hues/>", Some(MetadataKind::Hues))]
    #[case("<OverlayData/>", None)]
    #[case("<!DOCTYPE info>\n<info><name>D</name></info>", Some(MetadataKind::Info))]
    #[case(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE images SYSTEM \"images.dtd\" [\n  <!ENTITY note \"a > b\">\n  <!ELEMENT images ANY>\n]>\n<images/>",
        Some(MetadataKind::Images)
    )]
    fn test_classification(#[case] xml: &str, #[case] expected: Option<MetadataKind>) {
        let kind = parse(xml).unwrap().map(|metadata| metadata.kind());
        assert_eq!(kind, expected);
    }

    #[rstest]
    #[case::not_xml("<images><image name=\"ball\"></images>")]
    #[case::empty("")]
    #[case::only_comment("<!-- nothing here -->")]
    #[case::bad_int("<images><image name=\"ball\"><centerPixel>left</centerPixel></image></images>")]
    fn test_invalid_documents(#[case] xml: &str) {
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, RespackError::Metadata { ref file, .. } if file == "test.xml"));
    }

    #[test]
    fn test_doctype_is_dropped_from_the_prolog_only() {
        let Some(Metadata::Info(info)) =
            parse("<!-- pack -->\n<!DOCTYPE info [<!ENTITY x 'y'>]>\n<info><name>Disco</name></info>").unwrap()
        else {
            panic!("expected info");
        };
        assert_eq!(info.name.as_deref(), Some("Disco"));

        assert_eq!(
            without_doctype("<info><name><![CDATA[<!DOCTYPE x>]]></name></info>").as_ref(),
            "<info><name><![CDATA[<!DOCTYPE x>]]></name></info>"
        );
        // unterminated declarations are left for the parser to reject
        assert!(parse("<!DOCTYPE info [\n<info/>").is_err());
    }

    #[test]
    fn test_not_utf8() {
        let err = parse_metadata("info.xml", &[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert!(matches!(err, RespackError::Metadata { .. }));
    }
}
