//! Translator configuration.
//!
//! Options arrive as JSON from the build orchestrator; every field has a
//! default so an empty object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::ir::{CompilerError, ERR_INVALID_INPUT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HtmlOutput {
    /// Module exporting the template factory `t`.
    pub runtime_module: String,
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self {
            runtime_module: "marko/src/runtime/html/index.js".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DomOutput {
    /// Module exporting the template factory `t`.
    pub runtime_module: String,
    /// Module exporting `r`, the lazy component registration entry point.
    pub registry_module: String,
    /// Module whose default export derives a component constructor.
    pub define_component_module: String,
}

impl Default for DomOutput {
    fn default() -> Self {
        Self {
            runtime_module: "marko/src/runtime/vdom/index.js".to_string(),
            registry_module: "marko/src/runtime/components/registry-browser.js".to_string(),
            define_component_module: "marko/src/runtime/components/defineComponent.js"
                .to_string(),
        }
    }
}

/// The two mutually exclusive output targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputMode {
    /// String-emitting output: markup is written straight to the output stream.
    Html(HtmlOutput),
    /// Tree-emitting output: renders build a mutable node tree for incremental updates.
    Dom(DomOutput),
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Html(HtmlOutput::default())
    }
}

impl OutputMode {
    pub fn html() -> Self {
        OutputMode::Html(HtmlOutput::default())
    }

    pub fn dom() -> Self {
        OutputMode::Dom(DomOutput::default())
    }

    pub fn is_html(&self) -> bool {
        matches!(self, OutputMode::Html(_))
    }

    pub fn runtime_module(&self) -> &str {
        match self {
            OutputMode::Html(html) => &html.runtime_module,
            OutputMode::Dom(dom) => &dom.runtime_module,
        }
    }
}

/// Runtime helper modules shared by both output modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeModules {
    /// Default export: `(renderFn, options, component) -> renderer`.
    pub renderer: String,
    /// Named export `x`: XML escaping.
    pub escape_xml: String,
    pub to_string: String,
    pub attr: String,
    pub render_tag: String,
    pub dynamic_tag: String,
}

impl Default for RuntimeModules {
    fn default() -> Self {
        Self {
            renderer: "marko/src/runtime/components/renderer.js".to_string(),
            escape_xml: "marko/src/runtime/html/helpers/escape-xml.js".to_string(),
            to_string: "marko/src/runtime/html/helpers/to-string.js".to_string(),
            attr: "marko/src/runtime/html/helpers/attr.js".to_string(),
            render_tag: "marko/src/runtime/helpers/render-tag.js".to_string(),
            dynamic_tag: "marko/src/runtime/helpers/dynamic-tag.js".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateOptions {
    pub output: OutputMode,
    /// Emit `template.meta` and pass `__filename` to the template factory.
    pub meta: bool,
    /// Production build. When false the renderer receives `d: true`.
    pub optimize: bool,
    pub write_version_comment: bool,
    pub preserve_comments: bool,
    pub runtime: RuntimeModules,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            output: OutputMode::default(),
            meta: true,
            optimize: false,
            write_version_comment: true,
            preserve_comments: false,
            runtime: RuntimeModules::default(),
        }
    }
}

impl TranslateOptions {
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(json).map_err(|e| {
            CompilerError::new(
                ERR_INVALID_INPUT,
                &format!("Invalid translator options: {}", e),
                "<options>",
                e.line() as u32,
                e.column() as u32,
            )
        })
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_use_defaults() {
        let options = TranslateOptions::from_json("{}").unwrap();
        assert_eq!(options, TranslateOptions::default());
        assert!(options.meta);
        assert!(options.output.is_html());
    }

    #[test]
    fn test_dom_mode_partial_config() {
        let options = TranslateOptions::from_json(
            r#"{ "output": { "type": "dom", "registryModule": "./registry.js" }, "optimize": true }"#,
        )
        .unwrap();

        match &options.output {
            OutputMode::Dom(dom) => {
                assert_eq!(dom.registry_module, "./registry.js");
                assert_eq!(dom.runtime_module, "marko/src/runtime/vdom/index.js");
            }
            other => panic!("expected dom output, got {:?}", other),
        }
        assert!(options.optimize);
    }

    #[test]
    fn test_invalid_options_error_code() {
        let err = TranslateOptions::from_json(r#"{ "output": { "type": "pdf" } }"#).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_INPUT);
    }
}
