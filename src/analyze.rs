//! Program analysis.
//!
//! Runs before anything is rewritten: fills in the component flags from the
//! companion files and inline class blocks, collects macro names, and decides
//! whether any tag invocation exposes component state to its body.

use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::companion::resolve_component_files;
use crate::fs::FileSystem;
use crate::ir::{BodyItem, Program, TagNode, TemplateNode};
use crate::registry::TagDefinition;
use crate::script::{literal_value, Literal};
use crate::unit::{CompilationUnit, FileSummary};
use crate::visitor::for_each_tag;

/// Cross-file questions the analyzer needs answered.
///
/// `file_summary` may have to analyze another template first. It returns
/// `None` when that file cannot be produced, including when it is already
/// being analyzed further up the stack.
pub trait TagFiles {
    fn lookup_tag(&self, from: &Path, name: &str) -> Option<TagDefinition>;

    fn is_native_tag(&self, from: &Path, name: &str) -> bool;

    fn file_summary(&mut self, template: &Path) -> Option<FileSummary>;
}

pub fn analyze_program(
    unit: &mut CompilationUnit,
    program: &Program,
    fs: &dyn FileSystem,
    files: &mut dyn TagFiles,
) {
    let companions = resolve_component_files(unit, fs);
    let has_inline_class = program
        .body
        .iter()
        .any(|item| matches!(item, BodyItem::Template(TemplateNode::Class(_))));

    let meta = unit.meta_mut();
    meta.has_component = companions.component_file.is_some() || has_inline_class;
    meta.has_component_browser = companions.component_browser_file.is_some();

    let roots: Vec<&TemplateNode> = program
        .body
        .iter()
        .filter_map(|item| match item {
            BodyItem::Template(node) => Some(node),
            _ => None,
        })
        .collect();

    for root in &roots {
        for_each_tag(std::slice::from_ref(*root), &mut |tag, _| {
            if let Some(name) = macro_name(tag) {
                unit.meta_mut().macros.insert(name);
            }
        });
    }

    for root in &roots {
        for_each_tag(std::slice::from_ref(*root), &mut |tag, ancestors| {
            has_stateful_capture(unit, tag, ancestors, files);
        });
    }

    debug!(
        "[Translator] Analyzed {}: component={} browser={} capture={:?}",
        unit.file_name(),
        unit.meta().has_component,
        unit.meta().has_component_browser,
        unit.meta().has_stateful_capture
    );
}

/// `<macro name="x">` declares `x` for the rest of the file.
fn macro_name(tag: &TagNode) -> Option<String> {
    if tag.static_name() != Some("macro") {
        return None;
    }
    match literal_value(&tag.attribute("name")?.value)? {
        Literal::String(name) => Some(name),
        _ => None,
    }
}

/// The tag an attribute tag ultimately belongs to.
///
/// Walks outward through enclosing attribute tags and stops at the first
/// non-attribute tag. A plain tag owns itself.
pub fn find_owning_tag<'a>(tag: &'a TagNode, ancestors: &[&'a TagNode]) -> Option<&'a TagNode> {
    if !tag.is_attribute_tag() {
        return Some(tag);
    }
    ancestors
        .iter()
        .rev()
        .copied()
        .find(|ancestor| !ancestor.is_attribute_tag())
}

/// Whether `tag` may hand component state to its body parameters.
///
/// The answer is memoized on the whole file: once any invocation is found to
/// capture state, every later check returns true without looking.
pub fn has_stateful_capture(
    unit: &mut CompilationUnit,
    tag: &TagNode,
    ancestors: &[&TagNode],
    files: &mut dyn TagFiles,
) -> bool {
    if unit.meta().has_stateful_capture.is_yes() {
        return true;
    }

    if tag.body.params.is_empty() {
        return false;
    }

    let name = match tag.static_name() {
        Some(name) => name,
        None => {
            trace!("[Translator] Dynamic tag with body params in {}", unit.file_name());
            unit.meta_mut().record_stateful_capture(true);
            return true;
        }
    };

    if files.is_native_tag(unit.path(), name) || unit.meta().macros.contains(name) {
        return false;
    }

    let Some(owner_name) = find_owning_tag(tag, ancestors).and_then(|owner| owner.static_name())
    else {
        return false;
    };

    let Some(template) = owning_template(files, unit.path(), owner_name) else {
        trace!("[Translator] <{}> has no template file", owner_name);
        return false;
    };

    let Some(summary) = files.file_summary(&template) else {
        debug!(
            "[Translator] Could not load {:?} for <{}>, leaving capture undecided",
            template, owner_name
        );
        return false;
    };

    let detected =
        summary.has_stateful_capture || (summary.has_component && !summary.has_component_browser);
    unit.meta_mut().record_stateful_capture(detected);
    detected
}

fn owning_template(files: &dyn TagFiles, from: &Path, name: &str) -> Option<PathBuf> {
    files.lookup_tag(from, name)?.template
}
