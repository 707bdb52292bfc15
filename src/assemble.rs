//! Output assembly.
//!
//! Wraps the lowered render body into the final module: template value,
//! component registration for the output mode, renderer wiring and the
//! optional metadata object.

use serde::{Deserialize, Serialize};
use std::mem;

use crate::ir::{CompilerError, ERR_META_SERIALIZE};
use crate::options::{OutputMode, TranslateOptions};
use crate::output::{js_string, ImportRegistry, ModuleItem, OutputModule, RenderOp};
use crate::paths::resolve_relative_path;
use crate::script::parse_expression_fragment;
use crate::unit::{CompilationUnit, ComponentFiles, Dependency, FileMetadata};

/// Shape of the metadata object attached to the template value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TemplateMeta {
    pub fn from_metadata(meta: &FileMetadata) -> Self {
        Self {
            id: meta.id.clone(),
            component: meta.component.clone(),
            deps: meta.deps.iter().map(Dependency::to_json).collect(),
            tags: meta.tags.clone(),
        }
    }
}

/// Flags passed to the renderer factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub component_type: String,
    /// `false` renders the template as an anonymous inline component.
    pub has_component_defined: bool,
    pub is_browser_split: bool,
    pub skip_optimizations: bool,
}

impl RenderOptions {
    pub fn to_object_literal(&self) -> String {
        let mut props = vec![format!("t: {}", self.component_type)];
        if !self.has_component_defined {
            props.push("i: true".to_string());
        }
        if self.is_browser_split {
            props.push("s: true".to_string());
        }
        if self.skip_optimizations {
            props.push("d: true".to_string());
        }
        format!("{{ {} }}", props.join(", "))
    }
}

/// Everything the render pass produced for one file.
#[derive(Debug, Default)]
pub struct AssemblyInput {
    pub module_scope: Vec<ModuleItem>,
    pub render_body: Vec<RenderOp>,
    pub inline_component: Option<String>,
    /// Render function parameter holding the component definition.
    pub component_def: String,
}

/// Settle the dependency list and component path.
///
/// Companion dependencies go first (stylesheet, then package descriptor),
/// and every path ends up relative to the compiling file.
pub fn finalize_metadata(unit: &mut CompilationUnit, companions: &ComponentFiles) {
    let path = unit.path().to_path_buf();
    let meta = unit.meta_mut();

    if let Some(package) = &companions.package_file {
        meta.deps.insert(0, Dependency::Package(package.clone()));
    }
    if let Some(style) = &companions.style_file {
        meta.deps.insert(0, Dependency::Path(style.clone()));
    }

    let component = if meta.has_component_browser {
        companions.component_browser_file.clone()
    } else if meta.has_component || meta.has_stateful_capture.is_yes() {
        Some(path.to_string_lossy().to_string())
    } else {
        None
    };
    meta.component = component.map(|c| resolve_relative_path(&path, &c));

    meta.deps = mem::take(&mut meta.deps)
        .into_iter()
        .map(|dep| dep.relative_to(&path))
        .collect();
}

pub fn assemble(
    unit: &mut CompilationUnit,
    options: &TranslateOptions,
    companions: &ComponentFiles,
    mut imports: ImportRegistry,
    input: AssemblyInput,
) -> Result<(OutputModule, TemplateMeta), CompilerError> {
    finalize_metadata(unit, companions);
    let path = unit.path().to_path_buf();
    let output = unit.output.clone();

    let component_class = match &companions.component_file {
        Some(file) => {
            let request = resolve_relative_path(&path, file);
            imports.import_default(unit, &request, "marko_component")
        }
        None => input.inline_component.unwrap_or_else(|| "{}".to_string()),
    };

    let component = unit.generate_uid("marko_component");
    let component_type = unit.generate_uid("marko_componentType");
    let template = unit.generate_uid("marko_template");
    let renderer = imports.import_default(unit, &options.runtime.renderer, "marko_renderer");

    let header = options.write_version_comment.then(|| {
        format!(
            " Compiled using {}@{} - DO NOT EDIT",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    });

    let mut items = Vec::new();

    let factory = imports.import_named(unit, output.runtime_module(), "t", "t");
    let factory_args = if options.meta { "__filename" } else { "" };
    items.push(ModuleItem::Const(vec![(
        template.clone(),
        format!("{}({})", factory, factory_args),
    )]));
    items.push(ModuleItem::ExportDefault(template.clone()));
    items.extend(input.module_scope);

    let id = js_string(&unit.meta().id);
    let component_type_value = match &output {
        OutputMode::Html(_) => id,
        OutputMode::Dom(dom) => {
            let register =
                imports.import_named(unit, &dom.registry_module, "r", "marko_registerComponent");
            let lazy = match &companions.component_browser_file {
                Some(file) => {
                    let request = resolve_relative_path(&path, file);
                    imports.import_default(unit, &request, "marko_split_component")
                }
                None => template.clone(),
            };
            format!("{}({}, () => {})", register, id, lazy)
        }
    };
    items.push(ModuleItem::Const(vec![
        (component_type.clone(), component_type_value),
        (component.clone(), component_class),
    ]));

    let render_options = RenderOptions {
        component_type: component_type.clone(),
        has_component_defined: unit.meta().component.is_some(),
        is_browser_split: companions.component_browser_file.is_some(),
        skip_optimizations: !options.optimize,
    };
    items.push(ModuleItem::Render {
        target: format!("{}._", template),
        renderer,
        params: vec![
            "input".to_string(),
            "out".to_string(),
            input.component_def,
            "component".to_string(),
            "state".to_string(),
        ],
        body: input.render_body,
        options: render_options.to_object_literal(),
        component: component.clone(),
    });

    if let OutputMode::Dom(dom) = &output {
        let define =
            imports.import_default(unit, &dom.define_component_module, "marko_defineComponent");
        items.push(ModuleItem::Assign {
            target: format!("{}.Component", template),
            value: format!("{}({}, {}._)", define, component, template),
        });
    }

    let meta = TemplateMeta::from_metadata(unit.meta());
    if options.meta {
        items.push(ModuleItem::Assign {
            target: format!("{}.meta", template),
            value: meta_object_literal(&unit.file_name(), &component_type, &meta)?,
        });
    }

    Ok((
        OutputModule {
            header,
            imports,
            items,
        },
        meta,
    ))
}

fn meta_object_literal(
    file: &str,
    component_type: &str,
    meta: &TemplateMeta,
) -> Result<String, CompilerError> {
    let mut props = vec![format!("id: {}", component_type)];

    if let Some(component) = &meta.component {
        props.push(format!("component: {}", js_string(component)));
    }

    if !meta.deps.is_empty() {
        let deps = serde_json::to_string(&meta.deps).map_err(|e| {
            CompilerError::new(
                ERR_META_SERIALIZE,
                &format!("Could not serialize dependencies: {}", e),
                file,
                0,
                0,
            )
        })?;
        parse_expression_fragment(file, &deps).map_err(|e| {
            CompilerError::with_details(
                ERR_META_SERIALIZE,
                &e.message,
                file,
                0,
                0,
                e.context,
                vec![],
            )
        })?;
        props.push(format!("deps: {}", deps));
    }

    if !meta.tags.is_empty() {
        let tags: Vec<String> = meta.tags.iter().map(|t| js_string(t)).collect();
        props.push(format!("tags: [{}]", tags.join(", ")));
    }

    Ok(format!("{{\n  {}\n}}", props.join(",\n  ")))
}
