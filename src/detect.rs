use swc_core::ecma::{
    ast::{ImportDecl, Program},
    visit::{Visit, VisitWith},
};
use tracing::debug;

use crate::{parse::ParsedConfig, PP_MODULE};

/// Reports whether the preprocessor module is already imported.
///
/// Only the module path matters; the imported names are ignored.
pub fn is_installed(config: &ParsedConfig) -> bool {
    let installed = imports_module(&config.program, PP_MODULE);
    debug!(path = %config.path.display(), installed, "checked for preprocessor import");
    installed
}

/// Walks the whole program, not only the top level, for an import of `module`.
pub fn imports_module(program: &Program, module: &str) -> bool {
    let mut finder = ImportFinder {
        module,
        found: false,
    };
    program.visit_with(&mut finder);
    finder.found
}

struct ImportFinder<'a> {
    module: &'a str,
    found: bool,
}

impl Visit for ImportFinder<'_> {
    fn visit_import_decl(&mut self, n: &ImportDecl) {
        if &*n.src.value == self.module {
            self.found = true;
        }
    }
}
