//! Optional prettier-compatible formatting of the printed config.
//!
//! Formatting only happens when a prettier configuration is discoverable for
//! the target file and resolves to options. No style is invented otherwise.

use std::path::{Path, PathBuf};

use dprint_plugin_typescript::configuration::{
    Configuration, ConfigurationBuilder, QuoteStyle, SemiColons, SortOrder, TrailingCommas,
    UseParentheses,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Searched in every directory from the target's upwards; first hit wins.
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "package.yaml",
    ".prettierrc",
    ".prettierrc.json",
    ".prettierrc.yaml",
    ".prettierrc.yml",
    ".prettierrc.json5",
    ".prettierrc.js",
    ".prettierrc.cjs",
    ".prettierrc.mjs",
    ".prettierrc.ts",
    "prettier.config.js",
    "prettier.config.cjs",
    "prettier.config.mjs",
    "prettier.config.ts",
    ".prettierrc.toml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    All,
    Es5,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowParens {
    Always,
    Avoid,
}

/// The prettier options that carry over to the formatter. Unknown keys
/// (plugins, overrides, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrettierOptions {
    pub print_width: Option<u32>,
    pub tab_width: Option<u8>,
    pub use_tabs: Option<bool>,
    pub semi: Option<bool>,
    pub single_quote: Option<bool>,
    pub trailing_comma: Option<TrailingComma>,
    pub arrow_parens: Option<ArrowParens>,
}

impl PrettierOptions {
    /// Missing options take prettier's defaults. Prettier never reorders
    /// imports or exports, and it collapses arrays and argument lists that fit.
    pub fn to_dprint(&self) -> Configuration {
        let quote_style = if self.single_quote.unwrap_or(false) {
            QuoteStyle::PreferSingle
        } else {
            QuoteStyle::PreferDouble
        };
        let semi_colons = if self.semi.unwrap_or(true) {
            SemiColons::Prefer
        } else {
            SemiColons::Asi
        };
        let trailing_commas = match self.trailing_comma.unwrap_or(TrailingComma::All) {
            TrailingComma::All | TrailingComma::Es5 => TrailingCommas::OnlyMultiLine,
            TrailingComma::None => TrailingCommas::Never,
        };
        let arrow_parens = match self.arrow_parens.unwrap_or(ArrowParens::Always) {
            ArrowParens::Always => UseParentheses::Force,
            ArrowParens::Avoid => UseParentheses::PreferNone,
        };

        ConfigurationBuilder::new()
            .line_width(self.print_width.unwrap_or(80))
            .indent_width(self.tab_width.unwrap_or(2))
            .use_tabs(self.use_tabs.unwrap_or(false))
            .quote_style(quote_style)
            .semi_colons(semi_colons)
            .trailing_commas(trailing_commas)
            .arrow_function_use_parentheses(arrow_parens)
            .module_sort_import_declarations(SortOrder::Maintain)
            .module_sort_export_declarations(SortOrder::Maintain)
            .import_declaration_sort_named_imports(SortOrder::Maintain)
            .export_declaration_sort_named_exports(SortOrder::Maintain)
            .array_expression_prefer_single_line(true)
            .arguments_prefer_single_line(true)
            .build()
    }
}

/// A resolved prettier configuration and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub source: PathBuf,
    pub options: PrettierOptions,
}

/// Looks for a prettier config governing `target`.
///
/// `Ok(None)` when there is none, or when the one found cannot be resolved
/// here (JS/TOML configs, shared-config references, empty files). A config
/// file that exists but does not parse is an error.
pub fn resolve_style(target: &Path) -> Result<Option<StyleConfig>> {
    let Some(source) = find_config_file(target) else {
        debug!(target = %target.display(), "no prettier config found");
        return Ok(None);
    };
    let options = load_options(&source)?;
    debug!(config = %source.display(), resolved = options.is_some(), "found prettier config");
    Ok(options.map(|options| StyleConfig { source, options }))
}

pub fn find_config_file(target: &Path) -> Option<PathBuf> {
    let target = target
        .canonicalize()
        .unwrap_or_else(|_| target.to_path_buf());
    let start = target.parent()?;

    for dir in start.ancestors() {
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            if !candidate.is_file() {
                continue;
            }
            // package files only count when they carry a "prettier" key
            if name.starts_with("package.") && package_prettier_value(&candidate).is_none() {
                continue;
            }
            return Some(candidate);
        }
    }
    None
}

/// Runs `text` through the formatter as JavaScript, whatever the file's
/// extension.
pub fn format_source(path: &Path, text: &str, style: &StyleConfig) -> Result<String> {
    let config = style.options.to_dprint();
    let as_js = path.with_extension("js");
    match dprint_plugin_typescript::format_text(&as_js, None, text.to_string(), &config) {
        Ok(Some(formatted)) => Ok(formatted),
        Ok(None) => Ok(text.to_string()),
        Err(e) => Err(Error::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

// -----------------------------------------------------------------------------
// Config file loading
// -----------------------------------------------------------------------------

/// A prettier config after loading, before options are extracted.
enum RawConfig {
    Json(serde_json::Value),
    Yaml(serde_yaml::Value),
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn invalid(path: &Path, message: impl std::fmt::Display) -> Error {
    Error::Format {
        path: path.to_path_buf(),
        message: format!("invalid prettier configuration: {message}"),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| invalid(path, e))
}

fn package_prettier_value(path: &Path) -> Option<RawConfig> {
    let text = std::fs::read_to_string(path).ok()?;
    if file_name(path) == "package.json" {
        let mut value: serde_json::Value = serde_json::from_str(&text).ok()?;
        value.get_mut("prettier").map(|v| RawConfig::Json(v.take()))
    } else {
        let value: serde_yaml::Value = serde_yaml::from_str(&text).ok()?;
        value.get("prettier").cloned().map(RawConfig::Yaml)
    }
}

fn load_raw(path: &Path) -> Result<Option<RawConfig>> {
    let name = file_name(path);
    if name.starts_with("package.") {
        return Ok(package_prettier_value(path));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        // .prettierrc: JSON or YAML
        "" | "yaml" | "yml" => {
            let text = read(path)?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            serde_yaml::from_str(&text)
                .map(|v| Some(RawConfig::Yaml(v)))
                .map_err(|e| invalid(path, e))
        }
        "json" => {
            let text = read(path)?;
            serde_json::from_str(&text)
                .map(|v| Some(RawConfig::Json(v)))
                .map_err(|e| invalid(path, e))
        }
        // plain JSON is valid JSON5; anything beyond that cannot be read here
        "json5" => Ok(serde_json::from_str(&read(path)?).ok().map(RawConfig::Json)),
        _ => {
            debug!(config = %path.display(), "prettier config cannot be evaluated");
            Ok(None)
        }
    }
}

fn load_options(path: &Path) -> Result<Option<PrettierOptions>> {
    let options = match load_raw(path)? {
        None => None,
        Some(RawConfig::Json(value)) => match value {
            serde_json::Value::Object(_) => {
                Some(serde_json::from_value(value).map_err(|e| invalid(path, e))?)
            }
            // a string names a shared config package
            _ => None,
        },
        Some(RawConfig::Yaml(value)) => match value {
            serde_yaml::Value::Mapping(_) => {
                Some(serde_yaml::from_value(value).map_err(|e| invalid(path, e))?)
            }
            _ => None,
        },
    };
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let target = dir.path().join("svelte.config.js");
        fs::write(&target, "export default {};\n").unwrap();
        (dir, target)
    }

    #[test]
    fn no_config_resolves_to_none() {
        let (_dir, target) = project(&[]);
        assert_eq!(resolve_style(&target).unwrap(), None);
    }

    #[test]
    fn json_prettierrc() {
        let (_dir, target) = project(&[(
            ".prettierrc",
            r#"{ "useTabs": true, "singleQuote": true, "printWidth": 100, "plugins": ["prettier-plugin-svelte"] }"#,
        )]);
        let style = resolve_style(&target).unwrap().unwrap();
        assert_eq!(
            style.options,
            PrettierOptions {
                use_tabs: Some(true),
                single_quote: Some(true),
                print_width: Some(100),
                ..Default::default()
            }
        );
        assert!(style.source.ends_with(".prettierrc"));
    }

    #[test]
    fn yaml_prettierrc() {
        let (_dir, target) = project(&[(".prettierrc.yaml", "semi: false\ntrailingComma: none\n")]);
        let style = resolve_style(&target).unwrap().unwrap();
        assert_eq!(style.options.semi, Some(false));
        assert_eq!(style.options.trailing_comma, Some(TrailingComma::None));
    }

    #[test]
    fn package_json_prettier_key() {
        let (_dir, target) = project(&[(
            "package.json",
            r#"{ "name": "app", "prettier": { "tabWidth": 4 } }"#,
        )]);
        let style = resolve_style(&target).unwrap().unwrap();
        assert_eq!(style.options.tab_width, Some(4));
    }

    #[test]
    fn package_json_without_key_is_skipped() {
        let (_dir, target) = project(&[
            ("package.json", r#"{ "name": "app" }"#),
            (".prettierrc.json", r#"{ "semi": false }"#),
        ]);
        let style = resolve_style(&target).unwrap().unwrap();
        assert!(style.source.ends_with(".prettierrc.json"));
    }

    #[test]
    fn config_in_ancestor_directory_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".prettierrc"), "useTabs: true\n").unwrap();
        let app = dir.path().join("apps/web");
        fs::create_dir_all(&app).unwrap();
        let target = app.join("svelte.config.js");
        fs::write(&target, "export default {};\n").unwrap();

        let style = resolve_style(&target).unwrap().unwrap();
        assert_eq!(style.options.use_tabs, Some(true));
    }

    #[test]
    fn unresolvable_configs_resolve_to_none() {
        let (_dir, target) =
            project(&[("prettier.config.js", "export default { semi: false };\n")]);
        assert_eq!(resolve_style(&target).unwrap(), None);

        let (_dir, target) = project(&[(
            "package.json",
            r#"{ "prettier": "@company/prettier-config" }"#,
        )]);
        assert_eq!(resolve_style(&target).unwrap(), None);

        let (_dir, target) = project(&[(".prettierrc", "   \n")]);
        assert_eq!(resolve_style(&target).unwrap(), None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let (_dir, target) = project(&[(".prettierrc.json", "{ useTabs: ")]);
        let err = resolve_style(&target).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn formats_with_resolved_options() {
        let style = StyleConfig {
            source: PathBuf::from(".prettierrc"),
            options: PrettierOptions {
                use_tabs: Some(true),
                single_quote: Some(true),
                ..Default::default()
            },
        };
        let out = format_source(
            Path::new("svelte.config.js"),
            "export default {\n    kit: \"x\"\n};\n",
            &style,
        )
        .unwrap();
        assert!(out.contains("\tkit: 'x'"), "{out}");
    }

    #[test]
    fn formatting_is_stable() {
        let style = StyleConfig {
            source: PathBuf::from(".prettierrc"),
            options: PrettierOptions::default(),
        };
        let path = Path::new("svelte.config.js");
        let once = format_source(
            path,
            "import a from 'a';\nexport default {\n    preprocess: sequence([a(), preprocessMeltUI()])\n};\n",
            &style,
        )
        .unwrap();
        let twice = format_source(path, &once, &style).unwrap();
        pretty_assertions::assert_eq!(once, twice);
    }

    #[test]
    fn import_and_specifier_order_is_kept() {
        let style = StyleConfig {
            source: PathBuf::from(".prettierrc"),
            options: PrettierOptions::default(),
        };
        let out = format_source(
            Path::new("svelte.config.js"),
            "import { z, a } from \"z\";\nimport b from \"b\";\nexport { y, x };\n",
            &style,
        )
        .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec!["import { z, a } from \"z\";", "import b from \"b\";", "export { y, x };"]
        );
    }

    #[test]
    fn arrays_that_fit_are_collapsed() {
        let style = StyleConfig {
            source: PathBuf::from(".prettierrc"),
            options: PrettierOptions::default(),
        };
        let out = format_source(
            Path::new("svelte.config.js"),
            "export default {\n  preprocess: sequence([\n    a(),\n    b()\n  ])\n};\n",
            &style,
        )
        .unwrap();
        assert!(out.contains("  preprocess: sequence([a(), b()]),"), "{out}");
    }

    #[test]
    fn unparsable_text_fails_formatting() {
        let style = StyleConfig {
            source: PathBuf::from(".prettierrc"),
            options: PrettierOptions::default(),
        };
        let err =
            format_source(Path::new("svelte.config.js"), "export default {", &style).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }
}
