//! # Template Translator
//!
//! Lowers a parsed template program into an executable render module.
//!
//! ## Pipeline
//!
//! 1. **Analyze**: resolve companion files, collect macros, decide whether any
//!    tag invocation captures component state (memoized per file, across files).
//! 2. **Classify**: flag compile-time constant content as `static`.
//! 3. **Extract**: split the top level into module scope and render scope.
//! 4. **Lower**: turn render-scope nodes into render operations.
//! 5. **Assemble**: template value, component registration, renderer wiring,
//!    metadata. Tag imports are rewritten on the way.
//! 6. **Batch**: merge adjacent constant writes.
//!
//! ## Degrading to absence
//!
//! Missing companion files, unknown tags and unloadable tag templates are not
//! errors. Only malformed input and unparseable synthesized code abort a file.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod analyze;
mod assemble;
mod classify;
mod companion;
mod extract;
mod fs;
mod imports;
mod ir;
mod lower;
mod optimize;
mod options;
mod output;
mod paths;
mod registry;
mod script;
mod session;
mod unit;
mod visitor;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod analyze_tests;
#[cfg(test)]
mod companion_tests;

pub use analyze::{analyze_program, find_owning_tag, has_stateful_capture, TagFiles};
pub use assemble::{assemble, finalize_metadata, AssemblyInput, RenderOptions, TemplateMeta};
pub use classify::classify;
pub use companion::resolve_component_files;
pub use extract::{split_render_body, SplitBody};
pub use fs::{FileSystem, NativeFileSystem};
pub use imports::rewrite_tag_import;
pub use ir::*;
pub use lower::{escape_xml_text, LoweringContext, NodeLowering, StandardLowering};
pub use optimize::{optimize_module_writes, optimize_writes};
pub use options::{DomOutput, HtmlOutput, OutputMode, RuntimeModules, TranslateOptions};
pub use output::{ImportRegistry, ModuleItem, OutputModule, RenderOp};
pub use paths::resolve_relative_path;
pub use registry::{
    is_known_element, resolve_tag_import, DirectoryTagRegistry, StaticTagRegistry, TagDefinition,
    TagRegistry,
};
pub use script::{declared_names, literal_value, parse_expression_fragment, parse_module_code, Literal};
pub use session::{MemorySourceLoader, NoSourceLoader, Session, SourceLoader, TranslatedTemplate};
pub use unit::{
    generate_template_id, CompilationUnit, ComponentFiles, Dependency, FileMetadata, FileSummary,
    StatefulCapture,
};
pub use visitor::{for_each_tag, walk_children, walk_node, walk_program, walk_tag, TemplateVisitor};

/// Translate a program given as JSON with options given as JSON.
///
/// Uses the real file system and `components/` directory discovery.
pub fn translate_template(
    file_path: &str,
    program_json: &str,
    options_json: &str,
) -> Result<TranslatedTemplate, CompilerError> {
    let options = if options_json.trim().is_empty() {
        TranslateOptions::default()
    } else {
        TranslateOptions::from_json(options_json)?
    };
    let program: Program = serde_json::from_str(program_json).map_err(|e| {
        CompilerError::new(
            ERR_INVALID_INPUT,
            &format!("Invalid program: {}", e),
            file_path,
            e.line() as u32,
            e.column() as u32,
        )
    })?;

    Session::new(options).translate(file_path, program)
}

#[cfg(feature = "napi")]
#[napi]
pub fn translate_template_native(
    file_path: String,
    program_json: String,
    options_json: String,
) -> napi::Result<serde_json::Value> {
    let translated = translate_template(&file_path, &program_json, &options_json)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_value(translated).map_err(|e| napi::Error::from_reason(e.to_string()))
}
