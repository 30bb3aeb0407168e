use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a post from being inserted.
#[derive(Error, Debug)]
pub(crate) enum InsertError {
    #[error("HTML file not found or path not specified: {0:?}")]
    InputNotFound(PathBuf),

    #[error("Error parsing HTML: {0}")]
    Parse(String),

    #[error("{0}")]
    Structural(String),

    #[error("{0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InsertError {
    pub(super) fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> InsertError {
        let context = context.into();
        move |source| InsertError::Io { context, source }
    }
}
