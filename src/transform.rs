use swc_core::{
    common::{util::take::Take, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::{ImportPhase, *},
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::{PP_LOCAL, PP_MODULE, SEQUENCE_LOCAL, SEQUENCE_MODULE, TARGET_KEY};

// -----------------------------------------------------------------------------
// Entry
// -----------------------------------------------------------------------------

/// Why [`inject`] refused to touch a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectError {
    /// Scripts have no module body to hold `import` declarations. The parser
    /// always produces modules; this guards programs built elsewhere.
    NoModuleBody,
}

/// Prepends the preprocessor imports and rewrites every `preprocess` property.
///
/// The imports go in even when nothing matches, and matching is not scoped to
/// the exported object: any `preprocess` key anywhere in the module is
/// rewritten. Returns the number of rewritten properties.
pub fn inject(program: &mut Program) -> Result<usize, InjectError> {
    let Program::Module(module) = program else {
        return Err(InjectError::NoModuleBody);
    };

    module.body.splice(0..0, preprocessor_imports());

    let mut injector = PreprocessInjector::default();
    module.visit_mut_with(&mut injector);
    Ok(injector.rewritten)
}

// -----------------------------------------------------------------------------
// Property rewrite
// -----------------------------------------------------------------------------

#[derive(Default)]
struct PreprocessInjector {
    rewritten: usize,
}

impl PreprocessInjector {
    fn is_target_key(key: &PropName) -> bool {
        match key {
            // preprocess: []
            PropName::Ident(i) => &*i.sym == TARGET_KEY,
            // "preprocess": []
            PropName::Str(s) => &*s.value == TARGET_KEY,
            // ['preprocess']: []
            PropName::Computed(c) => {
                matches!(&*c.expr, Expr::Lit(Lit::Str(s)) if &*s.value == TARGET_KEY)
            }
            _ => false,
        }
    }

    /// `[a, b]` becomes `sequence([a, b, preprocessMeltUI()])`,
    /// anything else becomes `sequence([value, preprocessMeltUI()])`.
    fn chain(&mut self, value: Box<Expr>) -> Box<Expr> {
        self.rewritten += 1;
        let elements = match *value {
            Expr::Array(mut arr) => {
                arr.elems.push(Some(arg(pp_call())));
                arr
            }
            other => ArrayLit {
                span: DUMMY_SP,
                elems: vec![Some(arg(Box::new(other))), Some(arg(pp_call()))],
            },
        };
        Box::new(Expr::Call(call(SEQUENCE_LOCAL, vec![arg(Box::new(Expr::Array(elements)))])))
    }
}

impl VisitMut for PreprocessInjector {
    fn visit_mut_prop(&mut self, n: &mut Prop) {
        match n {
            Prop::KeyValue(kv) if Self::is_target_key(&kv.key) => {
                kv.value = self.chain(kv.value.take());
            }
            // { preprocess } expands to a key/value pair
            Prop::Shorthand(id) if &*id.sym == TARGET_KEY => {
                let key = PropName::Ident(IdentName::new(id.sym.clone(), id.span));
                let value = self.chain(Box::new(Expr::Ident(id.clone())));
                *n = Prop::KeyValue(KeyValueProp { key, value });
            }
            _ => {}
        }

        // The original value now sits inside the new call; nested targets
        // in it are rewritten too.
        n.visit_mut_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Node builders
// -----------------------------------------------------------------------------

fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

fn arg(expr: Box<Expr>) -> ExprOrSpread {
    ExprOrSpread { spread: None, expr }
}

fn call(callee: &str, args: Vec<ExprOrSpread>) -> CallExpr {
    CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(Box::new(Expr::Ident(ident(callee)))),
        args,
        type_args: None,
        ctxt: SyntaxContext::empty(),
    }
}

// preprocessMeltUI()
fn pp_call() -> Box<Expr> {
    Box::new(Expr::Call(call(PP_LOCAL, vec![])))
}

fn import_from(specifier: ImportSpecifier, module: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![specifier],
        src: Box::new(Str {
            span: DUMMY_SP,
            value: module.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// In order:
///   import { preprocessMeltUI } from "@melt-ui/pp";
///   import sequence from "svelte-sequential-preprocessor";
fn preprocessor_imports() -> Vec<ModuleItem> {
    let named = ImportSpecifier::Named(ImportNamedSpecifier {
        span: DUMMY_SP,
        local: ident(PP_LOCAL),
        imported: None,
        is_type_only: false,
    });
    let default = ImportSpecifier::Default(ImportDefaultSpecifier {
        span: DUMMY_SP,
        local: ident(SEQUENCE_LOCAL),
    });
    vec![
        import_from(named, PP_MODULE),
        import_from(default, SEQUENCE_MODULE),
    ]
}
