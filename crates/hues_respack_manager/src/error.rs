use miette::Diagnostic;
use thiserror::Error;

pub type Result<T, E = RespackError> = std::result::Result<T, E>;

#[derive(Debug, Error, Diagnostic)]
pub enum RespackError {
    /// The container could not be opened or listed. Nothing of the pack is kept.
    #[error("failed to read respack container {path}")]
    #[diagnostic(code(hues::respack::container))]
    Container {
        path: String,
        #[source]
        source: ContainerSource,
    },

    /// One metadata document is invalid, which invalidates the whole pack.
    #[error("invalid metadata document {file}: {reason}")]
    #[diagnostic(
        code(hues::respack::metadata),
        help("info.xml, images.xml, songs.xml and hues.xml must be well formed xml")
    )]
    Metadata { file: String, reason: String },

    #[error("{name} not found")]
    #[diagnostic(code(hues::respack::not_found))]
    NotFound { name: String },

    #[error("respack {id} has been closed")]
    #[diagnostic(code(hues::respack::closed))]
    Closed { id: String },

    #[error("failed to read {name}")]
    #[diagnostic(code(hues::respack::read))]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ContainerSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl RespackError {
    pub(crate) fn container(path: impl Into<String>, source: impl Into<ContainerSource>) -> Self {
        RespackError::Container {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn metadata(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        RespackError::Metadata {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RespackError::NotFound { .. })
    }
}
