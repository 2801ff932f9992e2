use serde::Serialize;

/// Content of `info.xml`. Every field is optional in the wild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RespackInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl RespackInfo {
    /// display name, `fallback` (the pack id) when the document does not provide one
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }
}
