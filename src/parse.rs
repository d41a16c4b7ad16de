use std::path::{Path, PathBuf};

use swc_core::{
    common::{comments::SingleThreadedComments, sync::Lrc, FileName, SourceMap, Spanned},
    ecma::{
        ast::{EsVersion, Program},
        parser::{error::Error as SyntaxError, parse_file_as_module, EsSyntax, Syntax},
    },
};
use tracing::debug;

use crate::error::{Error, Result};

/// A config file parsed into a syntax tree plus its side-channel comments.
///
/// Owns everything a single run needs; consumed by [`crate::install`].
pub struct ParsedConfig {
    pub path: PathBuf,
    pub program: Program,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
}

pub fn parse_config(path: &Path) -> Result<ParsedConfig> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(path, source)
}

/// Parses `source` as if it were read from `path`.
///
/// Always uses the module grammar, so the tree has a module body even when the
/// file has no `import`/`export`. Script-only syntax is a parse error.
///
/// Errors the parser managed to recover from are still fatal: a partially
/// understood config is never rewritten.
pub fn parse_source(path: &Path, source: String) -> Result<ParsedConfig> {
    let source_map: Lrc<SourceMap> = Default::default();
    let fm = source_map.new_source_file(FileName::Real(path.to_path_buf()).into(), source);
    let comments = SingleThreadedComments::default();

    let mut recovered = vec![];
    let parsed = parse_file_as_module(
        &fm,
        Syntax::Es(EsSyntax::default()),
        EsVersion::EsNext,
        Some(&comments),
        &mut recovered,
    );

    let module = match parsed {
        Ok(module) => {
            if let Some(first) = recovered.into_iter().next() {
                return Err(syntax_error(&source_map, path, first));
            }
            module
        }
        Err(err) => return Err(syntax_error(&source_map, path, err)),
    };

    debug!(path = %path.display(), items = module.body.len(), "parsed config");

    Ok(ParsedConfig {
        path: path.to_path_buf(),
        program: Program::Module(module),
        comments,
        source_map,
    })
}

fn syntax_error(cm: &Lrc<SourceMap>, path: &Path, err: SyntaxError) -> Error {
    let loc = cm.lookup_char_pos(err.span().lo);
    Error::Parse {
        path: path.to_path_buf(),
        line: loc.line,
        column: loc.col_display + 1,
        message: err.kind().msg().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::comments::Comments;

    fn parse(src: &str) -> Result<ParsedConfig> {
        parse_source(Path::new("svelte.config.js"), src.to_string())
    }

    #[test]
    fn module_syntax_yields_module() {
        let parsed = parse("import a from 'a';\nexport default { preprocess: [a()] };\n").unwrap();
        assert!(matches!(parsed.program, Program::Module(_)));
    }

    #[test]
    fn files_without_imports_still_parse_as_modules() {
        for src in [
            "module.exports = { preprocess: [] };\n",
            "const config = {};\nglobalThis.config = config;\n",
            "// only a comment\n",
            "",
        ] {
            let parsed = parse(src).unwrap();
            assert!(matches!(parsed.program, Program::Module(_)), "{src:?}");
        }
    }

    #[test]
    fn script_only_syntax_is_a_parse_error() {
        let err = parse("with (config) { preprocess = []; }\n").err().unwrap();
        assert!(matches!(err, Error::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn comments_go_to_side_channel() {
        let parsed = parse("// header\nexport default {};\n").unwrap();
        let Program::Module(module) = &parsed.program else {
            panic!("expected module");
        };
        let first = swc_core::common::Spanned::span(&module.body[0]);
        let leading = parsed.comments.get_leading(first.lo).unwrap_or_default();
        assert_eq!(leading.len(), 1);
        assert_eq!(&*leading[0].text, " header");
    }

    #[test]
    fn invalid_syntax_is_reported_with_location() {
        let err = parse("export default {\n  preprocess: [,\n").err().unwrap();
        match err {
            Error::Parse { line, path, .. } => {
                assert!(line >= 2);
                assert_eq!(path, PathBuf::from("svelte.config.js"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = parse_config(Path::new("/definitely/not/here/svelte.config.js"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Read { .. }));
    }
}
