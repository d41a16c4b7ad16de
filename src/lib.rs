//! Wires the MeltUI preprocessor into an existing `svelte.config.js`.
//!
//! ```text
//! export default { preprocess: [vitePreprocess()] };
//! ```
//! becomes
//! ```text
//! import { preprocessMeltUI } from "@melt-ui/pp";
//! import sequence from "svelte-sequential-preprocessor";
//! export default { preprocess: sequence([vitePreprocess(), preprocessMeltUI()]) };
//! ```
//!
//! The pipeline is parse → detect → transform → reattach comments → print →
//! format (when a prettier config is found) → write. The file is written once,
//! at the end; any earlier failure leaves it untouched.

use std::path::Path;

use tracing::{info, warn};

pub mod comments;
pub mod detect;
pub mod error;
pub mod format;
pub mod package_manager;
pub mod parse;
pub mod print;
pub mod transform;

pub use detect::is_installed;
pub use error::{Error, Result};
pub use parse::{parse_config, ParsedConfig};

/// Module providing the preprocessor.
pub const PP_MODULE: &str = "@melt-ui/pp";
/// Local name the preprocessor is imported under.
pub const PP_LOCAL: &str = "preprocessMeltUI";
/// Module providing the sequencing helper (default export).
pub const SEQUENCE_MODULE: &str = "svelte-sequential-preprocessor";
/// Local name the sequencing helper is imported under.
pub const SEQUENCE_LOCAL: &str = "sequence";
/// Config property that gets rewritten.
pub const TARGET_KEY: &str = "preprocess";

/// What [`update_config`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten; `rewritten` counts the `preprocess` properties
    /// changed, and may be zero.
    Installed { rewritten: usize },
    /// The file already imports the preprocessor and was left alone.
    AlreadyInstalled,
}

/// Parses the config at `path` and installs the preprocessor unless it is
/// already imported.
pub fn update_config(path: &Path) -> Result<Outcome> {
    let config = parse_config(path)?;
    if is_installed(&config) {
        info!(path = %path.display(), "preprocessor already installed");
        return Ok(Outcome::AlreadyInstalled);
    }
    let rewritten = install(config)?;
    Ok(Outcome::Installed { rewritten })
}

/// Rewrites a parsed config and writes it back to its path.
///
/// Does not check [`is_installed`]; callers decide what to do with an
/// already-installed config before getting here.
pub fn install(config: ParsedConfig) -> Result<usize> {
    let path = config.path.clone();
    let (rewritten, text) = render(config)?;

    let text = match format::resolve_style(&path)? {
        Some(style) => format::format_source(&path, &text, &style)?,
        None => text,
    };

    std::fs::write(&path, text).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), rewritten, "updated config");
    Ok(rewritten)
}

/// Transforms and prints a parsed config without formatting or writing it.
pub fn render(config: ParsedConfig) -> Result<(usize, String)> {
    let ParsedConfig {
        path,
        mut program,
        comments,
        source_map,
    } = config;

    let rewritten = transform::inject(&mut program)
        .map_err(|_| Error::StructuralAssumption { path: path.clone() })?;
    if rewritten == 0 {
        warn!(
            path = %path.display(),
            "no `{TARGET_KEY}` property found; imports were added anyway"
        );
    }

    comments::reattach(&program, &comments);
    let text = print::emit(&program, &comments, source_map)?;
    Ok((rewritten, text))
}
