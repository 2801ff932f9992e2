use serde::Serialize;

/// `<hue name="…">color</hue>`. Parsed and served, never resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HueEntry {
    pub name: String,
    pub color: String,
}
