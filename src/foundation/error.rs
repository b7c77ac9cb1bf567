use std::path::PathBuf;

/// Result alias used across the engine.
pub type DeckResult<T> = Result<T, DeckError>;

/// Errors produced by the slide engine.
///
/// `ImageDecode` and `UnsupportedTemplate` are recoverable: the composer logs them and substitutes
/// a safe default. They are public so collaborators (and tests) can name them, but a build never
/// returns them.
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    /// A deck background has no renderable page after the cover-page skip.
    #[error("empty template: '{}' has no renderable pages", path.display())]
    EmptyTemplate {
        /// Deck file that produced no pages.
        path: PathBuf,
    },

    /// Font color is not a 6-hex-digit color.
    #[error("invalid color: \"{value}\" (expected RRGGBB or #RRGGBB)")]
    InvalidColor {
        /// Offending input, verbatim.
        value: String,
    },

    /// A deck background was requested but no installed renderer can open it.
    #[error("missing renderer: template {template_id} needs a deck renderer for '{}'", path.display())]
    MissingRenderer {
        /// Template id that resolved to the deck.
        template_id: u32,
        /// Deck file.
        path: PathBuf,
    },

    /// A background or user image could not be decoded.
    #[error("image decode failure: '{}': {reason}", path.display())]
    ImageDecode {
        /// Image file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A template id is not present in the registry.
    #[error("unsupported template: {template_id}")]
    UnsupportedTemplate {
        /// Unknown template id.
        template_id: u32,
    },

    /// Malformed request or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Filesystem failure.
    #[error("io error: {context}: {source}")]
    Io {
        /// What the engine was doing.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Anything else, with its context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    /// [`DeckError::Validation`] with `msg`.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// [`DeckError::InvalidColor`] for the rejected `value`.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }

    /// [`DeckError::ImageDecode`] for `path`.
    pub fn image_decode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ImageDecode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// [`DeckError::Io`] with what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// `true` for errors the composer absorbs with a default instead of aborting the build.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ImageDecode { .. } | Self::UnsupportedTemplate { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
