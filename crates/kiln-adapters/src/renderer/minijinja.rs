//! MiniJinja-backed renderer.
//!
//! One environment serves both escaping modes: the auto-escape callback
//! receives the output path as the template name and switches HTML escaping
//! on for markup suffixes only.

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};
use tracing::{instrument, trace};

use kiln_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{ConfigRecord, RelativePath},
    error::KilnResult,
};

/// Renders payloads with MiniJinja syntax (`{{ app_name }}`, `{% if %}`).
///
/// Undefined fields are errors and trailing newlines are kept as written.
/// Block tags (`{% ... %}`) swallow the newline that follows them and the
/// indentation before them, so a tag on its own line leaves no trace.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(escape_for);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Template names are output paths, so escaping follows the file class.
fn escape_for(name: &str) -> AutoEscape {
    match RelativePath::try_new(name) {
        Ok(path) if path.class().escapes_markup() => AutoEscape::Html,
        _ => AutoEscape::None,
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    #[instrument(skip_all, fields(path = %path))]
    fn render(&self, path: &RelativePath, raw: &str, record: &ConfigRecord) -> KilnResult<String> {
        trace!(class = ?path.class(), "Rendering");
        let ctx = Value::from_serialize(record.view());

        self.env
            .render_named_str(path.as_str(), raw, ctx)
            .map_err(|e| {
                let path = path.to_string();
                let reason = e.to_string();
                match e.kind() {
                    ErrorKind::SyntaxError => ApplicationError::TemplateSyntax { path, reason },
                    _ => ApplicationError::TemplateExecution { path, reason },
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::error::KilnError;

    fn record() -> ConfigRecord {
        ConfigRecord::builder()
            .app_name("shop")
            .description("<b>Shop & co")
            .module_path("example.com/shop")
            .build()
            .unwrap()
    }

    fn render(path: &str, raw: &str) -> KilnResult<String> {
        MiniJinjaRenderer::new().render(&RelativePath::try_new(path).unwrap(), raw, &record())
    }

    #[test]
    fn markup_suffixes_escape() {
        for path in ["index.html", "page.HTM", "feed.xml", "icon.svg", "layout.tmpl"] {
            assert_eq!(
                render(path, "<h1>{{ description }}</h1>").unwrap(),
                "<h1>&lt;b&gt;Shop &amp; co</h1>",
                "{path}"
            );
        }
    }

    #[test]
    fn everything_else_is_verbatim() {
        for path in ["main.go", "README.md", "Makefile", ".env.example"] {
            assert_eq!(
                render(path, "// {{ description }}").unwrap(),
                "// <b>Shop & co",
                "{path}"
            );
        }
    }

    #[test]
    fn escape_mode_matches_file_class() {
        assert!(matches!(escape_for("web/templates/index.html"), AutoEscape::Html));
        assert!(matches!(escape_for("web/static/logo.SVG"), AutoEscape::Html));
        assert!(matches!(escape_for("cmd/api/main.go"), AutoEscape::None));
        assert!(matches!(escape_for("Dockerfile"), AutoEscape::None));
        // Names that are not valid output paths never escape.
        assert!(matches!(escape_for("/etc/index.html"), AutoEscape::None));
    }

    #[test]
    fn literal_markup_expression_follows_mode() {
        assert_eq!(render("a.html", r#"{{ "<b>" }}"#).unwrap(), "&lt;b&gt;");
        assert_eq!(render("a.go", r#"{{ "<b>" }}"#).unwrap(), "<b>");
    }

    #[test]
    fn derived_fields_and_conditionals() {
        let out = render(
            "go.mod",
            "module {{ module_path }}\n{% if has_database %}db{% else %}nodb{% endif %}\n",
        )
        .unwrap();
        assert_eq!(out, "module example.com/shop\nnodb");
    }

    #[test]
    fn block_lines_leave_no_blank_lines() {
        let out = render(
            "main.go",
            "import (\n    {% if has_ui %}\n\t\"html/template\"\n    {% endif %}\n\t\"fmt\"\n)\n",
        )
        .unwrap();
        assert_eq!(out, "import (\n\t\"fmt\"\n)\n");
    }

    #[test]
    fn trailing_newline_is_kept() {
        assert_eq!(render("x.txt", "{{ port }}\n").unwrap(), "8080\n");
    }

    #[test]
    fn undefined_field_is_an_execution_error() {
        let err = render("main.go", "{{ no_such_field }}").unwrap_err();
        match err {
            KilnError::Application(ApplicationError::TemplateExecution { path, .. }) => {
                assert_eq!(path, "main.go")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_syntax_is_a_syntax_error() {
        let err = render("index.html", "{% if %}").unwrap_err();
        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::TemplateSyntax { .. })
        ));
        assert!(render("index.html", "{{ app_name").is_err());
    }
}
