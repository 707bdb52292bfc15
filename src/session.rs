//! Compilation session.
//!
//! A `Session` compiles templates one at a time and remembers what it learned
//! about each file so cross-file questions are answered once. Loading another
//! template is on demand through a [`SourceLoader`].

use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::analyze::{analyze_program, TagFiles};
use crate::assemble::{assemble, AssemblyInput, TemplateMeta};
use crate::classify::classify;
use crate::companion::resolve_component_files;
use crate::extract::split_render_body;
use crate::fs::{FileSystem, NativeFileSystem};
use crate::imports::rewrite_tag_import;
use crate::ir::{BodyItem, CompilerError, Program, TemplateNode};
use crate::lower::{LoweringContext, NodeLowering, StandardLowering};
use crate::optimize::optimize_module_writes;
use crate::options::{OutputMode, TranslateOptions};
use crate::output::{js_string, ImportRegistry, ModuleItem};
use crate::registry::{DirectoryTagRegistry, TagDefinition, TagRegistry};
use crate::script::{declared_names, parse_module_code};
use crate::unit::{CompilationUnit, FileMetadata, FileSummary};

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Produces the parsed program of another template.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> Option<Program>;
}

/// Never loads anything; cross-file analysis stays undecided.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSourceLoader;

impl SourceLoader for NoSourceLoader {
    fn load(&self, _path: &Path) -> Option<Program> {
        None
    }
}

/// Serves programs registered up front.
#[derive(Debug, Default, Clone)]
pub struct MemorySourceLoader {
    programs: HashMap<PathBuf, Program>,
}

impl MemorySourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, program: Program) -> Self {
        self.programs.insert(path.into(), program);
        self
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, path: &Path) -> Option<Program> {
        self.programs.get(path).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedTemplate {
    pub code: String,
    /// The metadata object as emitted on the template value.
    pub meta: TemplateMeta,
    /// The unit's full record, taken when the unit is frozen at exit.
    pub metadata: FileMetadata,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum UnitState {
    InProgress,
    Analyzed(FileSummary),
}

pub struct Session {
    options: TranslateOptions,
    fs: Box<dyn FileSystem>,
    registry: Box<dyn TagRegistry>,
    loader: Box<dyn SourceLoader>,
    lowering: Box<dyn NodeLowering>,
    units: HashMap<PathBuf, UnitState>,
}

impl Session {
    /// Real disk, `components/` directory discovery, no cross-file loading.
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            fs: Box::new(NativeFileSystem),
            registry: Box::new(DirectoryTagRegistry::new()),
            loader: Box::new(NoSourceLoader),
            lowering: Box::new(StandardLowering),
            units: HashMap::new(),
        }
    }

    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_registry(mut self, registry: impl TagRegistry + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_lowering(mut self, lowering: impl NodeLowering + 'static) -> Self {
        self.lowering = Box::new(lowering);
        self
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// The recorded summary of `path`, if it has been analyzed.
    pub fn summary_of(&self, path: &Path) -> Option<FileSummary> {
        match self.units.get(path) {
            Some(UnitState::Analyzed(summary)) => Some(*summary),
            _ => None,
        }
    }

    /// Compile one template into its render module.
    pub fn translate(
        &mut self,
        path: impl Into<PathBuf>,
        program: Program,
    ) -> Result<TranslatedTemplate, CompilerError> {
        let path = path.into();
        let mut unit = CompilationUnit::new(&path, self.options.output.clone());
        unit.module_code = program.module_code.clone();

        if let Some(code) = unit.module_code.clone() {
            let code = parse_module_code(&unit.file_name(), &code)?;
            let metadata = unit.freeze();
            self.units
                .insert(path, UnitState::Analyzed(metadata.summary()));
            return Ok(TranslatedTemplate {
                code,
                meta: TemplateMeta::from_metadata(&metadata),
                metadata,
            });
        }

        self.units.insert(path.clone(), UnitState::InProgress);
        let result = self.translate_unit(&mut unit, program).map(|(code, meta)| {
            let file_name = unit.file_name();
            let metadata = unit.freeze();
            debug!(
                "[Translator] Translated {} ({} bytes, {} tag(s), {} dep(s))",
                file_name,
                code.len(),
                metadata.tags.len(),
                metadata.deps.len()
            );
            TranslatedTemplate {
                code,
                meta,
                metadata,
            }
        });
        match &result {
            Ok(translated) => {
                self.units
                    .insert(path, UnitState::Analyzed(translated.metadata.summary()));
            }
            Err(_) => {
                self.units.remove(&path);
            }
        }
        result
    }

    /// Run the pipeline over `unit`, returning the printed module and its
    /// metadata object. The caller freezes the unit afterwards.
    fn translate_unit(
        &mut self,
        unit: &mut CompilationUnit,
        mut program: Program,
    ) -> Result<(String, TemplateMeta), CompilerError> {
        self.analyze_unit(unit, &program);
        classify(&mut program, self.registry.as_ref(), unit.path());

        reserve_authored_names(unit, &program);
        let component_def = unit.generate_uid("component");

        let split = split_render_body(program.body);
        let mut module_scope = Vec::new();
        let mut inline_component = None;
        for item in split.module_scope {
            match item {
                BodyItem::Import(mut import) => {
                    rewrite_tag_import(unit, &mut import, self.registry.as_ref());
                    module_scope.push(ModuleItem::Import(import));
                }
                BodyItem::Statement(statement) => {
                    module_scope.push(ModuleItem::Statement(statement.code));
                }
                BodyItem::Template(TemplateNode::Scriptlet(scriptlet)) => {
                    module_scope.push(ModuleItem::Statement(scriptlet.code));
                }
                BodyItem::Template(TemplateNode::Class(class)) => {
                    if inline_component.is_some() {
                        debug!(
                            "[Translator] Multiple class blocks in {}, keeping the last",
                            unit.file_name()
                        );
                    }
                    inline_component = Some(class.code.trim().to_string());
                }
                BodyItem::Template(node) => {
                    warn!(
                        "[Translator] Dropping static output at {:?} in {}",
                        node.location(),
                        unit.file_name()
                    );
                }
            }
        }

        let mut imports = ImportRegistry::new();
        let (render_body, lowered_class) = {
            let mut cx = LoweringContext::new(
                unit,
                &self.options,
                &mut imports,
                self.registry.as_ref(),
                component_def.clone(),
            );
            let body = self.lowering.lower_children(&mut cx, split.render_scope)?;
            (body, cx.inline_component.take())
        };

        let companions = resolve_component_files(unit, self.fs.as_ref());
        let (mut module, meta) = assemble(
            unit,
            &self.options,
            &companions,
            imports,
            AssemblyInput {
                module_scope,
                render_body,
                inline_component: lowered_class.or(inline_component),
                component_def,
            },
        )?;

        optimize_module_writes(&mut module);
        Ok((module.print(), meta))
    }

    fn analyze_unit(&mut self, unit: &mut CompilationUnit, program: &Program) {
        let mut files = CrossFile {
            output: &self.options.output,
            fs: self.fs.as_ref(),
            registry: self.registry.as_ref(),
            loader: self.loader.as_ref(),
            units: &mut self.units,
        };
        let fs = files.fs;
        analyze_program(unit, program, fs, &mut files);
    }
}

/// The session's view for cross-file analysis, split off so the unit being
/// compiled can be borrowed alongside it.
struct CrossFile<'s> {
    output: &'s OutputMode,
    fs: &'s dyn FileSystem,
    registry: &'s dyn TagRegistry,
    loader: &'s dyn SourceLoader,
    units: &'s mut HashMap<PathBuf, UnitState>,
}

impl TagFiles for CrossFile<'_> {
    fn lookup_tag(&self, from: &Path, name: &str) -> Option<TagDefinition> {
        self.registry.lookup(from, name)
    }

    fn is_native_tag(&self, from: &Path, name: &str) -> bool {
        self.registry.is_native(from, name)
    }

    fn file_summary(&mut self, template: &Path) -> Option<FileSummary> {
        match self.units.get(template) {
            Some(UnitState::Analyzed(summary)) => return Some(*summary),
            Some(UnitState::InProgress) => {
                debug!("[Translator] {:?} is already being compiled", template);
                return None;
            }
            None => {}
        }

        let Some(program) = self.loader.load(template) else {
            debug!("[Translator] No source available for {:?}", template);
            return None;
        };

        self.units.insert(template.to_path_buf(), UnitState::InProgress);
        let mut unit = CompilationUnit::new(template, self.output.clone());
        if program.module_code.is_none() {
            let fs = self.fs;
            analyze_program(&mut unit, &program, fs, self);
        }

        let summary = unit.meta().summary();
        self.units
            .insert(template.to_path_buf(), UnitState::Analyzed(summary));
        Some(summary)
    }
}

/// Keep generated names clear of whatever the template declares at module scope.
fn reserve_authored_names(unit: &mut CompilationUnit, program: &Program) {
    for item in &program.body {
        let names = match item {
            BodyItem::Import(import) if !import.specifiers.trim().is_empty() => declared_names(
                &format!("import {} from {};", import.specifiers, js_string(&import.source)),
            ),
            BodyItem::Statement(statement) => declared_names(&statement.code),
            BodyItem::Template(TemplateNode::Scriptlet(scriptlet)) => {
                declared_names(&scriptlet.code)
            }
            _ => continue,
        };
        for name in names {
            unit.reserve_name(&name);
        }
    }
}
