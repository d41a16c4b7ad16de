use std::path::PathBuf;

/// Errors raised while updating a svelte config.
///
/// An already-installed preprocessor is not an error; see [`crate::Outcome`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid module syntax. Reported verbatim.
    #[error("{}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The parsed file has no module body to carry the new imports.
    #[error("could not update {}", path.display())]
    StructuralAssumption { path: PathBuf },

    #[error("failed to generate code: {0}")]
    Emit(String),

    #[error("failed to format {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{manager} failed to install dependencies: {detail}")]
    Install { manager: String, detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;
