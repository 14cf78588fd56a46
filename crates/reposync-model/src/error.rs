//! Error types for reposync-model

/// Result type for reposync-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing coordinates and repository specs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordinate string does not have 3 to 5 `:`-separated tokens
    #[error(
        "Invalid artifact '{input}', expected groupId:artifactId:version[:extension[:classifier]]"
    )]
    InvalidCoordinate { input: String },

    /// Repository spec is neither a URL nor `id::layout::url`
    #[error("Invalid syntax for repository '{input}', use \"id::layout::url\" or \"URL\"")]
    InvalidRepositorySpec { input: String },

    /// Repository layout is not known
    #[error("Invalid repository layout: {layout}")]
    UnknownLayout { layout: String },

    /// Repository URL could not be parsed
    #[error("Invalid repository URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
