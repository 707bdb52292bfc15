//! Output module model and printer.
//!
//! Lowering and assembly build an [`OutputModule`] instead of concatenating
//! strings directly, so the write batching pass can still see adjacent
//! writes after the structure is final.

use crate::ir::ImportDeclaration;
use crate::unit::CompilationUnit;

// ═══════════════════════════════════════════════════════════════════════════════
// RENDER OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// One statement of a render function body.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    /// Constant markup written to the output stream.
    Write(String),
    /// Any other statement, printed as is.
    Code(String),
    /// A statement with a nested body, e.g. `if (x) {` ... `}`.
    Block {
        open: String,
        body: Vec<RenderOp>,
        close: String,
    },
}

impl RenderOp {
    pub fn write(text: impl Into<String>) -> Self {
        RenderOp::Write(text.into())
    }

    pub fn code(code: impl Into<String>) -> Self {
        RenderOp::Code(code.into())
    }
}

/// JSON string literal, which is also a valid JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Object key: bare when it is a plain identifier, quoted otherwise.
pub fn js_key(key: &str) -> String {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if valid {
        key.to_string()
    } else {
        js_string(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOISTED IMPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportBinding {
    Default,
    Named(String),
}

#[derive(Debug, Clone)]
struct HoistedImport {
    source: String,
    binding: ImportBinding,
    local: String,
}

/// Imports the translator adds on its own. One local per source and binding.
#[derive(Debug, Default)]
pub struct ImportRegistry {
    imports: Vec<HoistedImport>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local name bound to the default export of `source`.
    pub fn import_default(&mut self, unit: &mut CompilationUnit, source: &str, hint: &str) -> String {
        self.hoist(unit, source, ImportBinding::Default, hint)
    }

    /// Local name bound to the named export `name` of `source`.
    pub fn import_named(
        &mut self,
        unit: &mut CompilationUnit,
        source: &str,
        name: &str,
        hint: &str,
    ) -> String {
        self.hoist(unit, source, ImportBinding::Named(name.to_string()), hint)
    }

    fn hoist(
        &mut self,
        unit: &mut CompilationUnit,
        source: &str,
        binding: ImportBinding,
        hint: &str,
    ) -> String {
        if let Some(existing) = self
            .imports
            .iter()
            .find(|import| import.source == source && import.binding == binding)
        {
            return existing.local.clone();
        }

        let local = unit.generate_uid(hint);
        self.imports.push(HoistedImport {
            source: source.to_string(),
            binding,
            local: local.clone(),
        });
        local
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// One declaration per source, sources in first-use order.
    fn print(&self, w: &mut Writer) {
        let mut sources: Vec<&str> = Vec::new();
        for import in &self.imports {
            if !sources.contains(&import.source.as_str()) {
                sources.push(&import.source);
            }
        }

        for source in sources {
            let mut default = None;
            let mut named = Vec::new();
            for import in self.imports.iter().filter(|i| i.source == source) {
                match &import.binding {
                    ImportBinding::Default => default = Some(import.local.as_str()),
                    ImportBinding::Named(name) if name == &import.local => named.push(name.clone()),
                    ImportBinding::Named(name) => {
                        named.push(format!("{} as {}", name, import.local))
                    }
                }
            }

            let clause = match (default, named.is_empty()) {
                (Some(default), true) => default.to_string(),
                (Some(default), false) => format!("{}, {{ {} }}", default, named.join(", ")),
                (None, _) => format!("{{ {} }}", named.join(", ")),
            };
            w.line(&format!("import {} from {};", clause, js_string(source)));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Authored import, possibly with a rewritten source.
    Import(ImportDeclaration),
    /// Authored module-scope code.
    Statement(String),
    /// `const a = x, b = y;`
    Const(Vec<(String, String)>),
    ExportDefault(String),
    /// `target = value;`
    Assign { target: String, value: String },
    /// `target = renderer(function (params) { body }, options, component);`
    Render {
        target: String,
        renderer: String,
        params: Vec<String>,
        body: Vec<RenderOp>,
        options: String,
        component: String,
    },
}

#[derive(Debug, Default)]
pub struct OutputModule {
    /// Line comment placed above everything else.
    pub header: Option<String>,
    pub imports: ImportRegistry,
    pub items: Vec<ModuleItem>,
}

impl OutputModule {
    pub fn print(&self) -> String {
        let mut w = Writer::default();
        if let Some(header) = &self.header {
            w.line(&format!("//{}", header));
        }
        self.imports.print(&mut w);
        for item in &self.items {
            print_item(&mut w, item);
        }
        w.finish()
    }

    /// The render function body, if the module has one.
    pub fn render_body_mut(&mut self) -> Option<&mut Vec<RenderOp>> {
        self.items.iter_mut().find_map(|item| match item {
            ModuleItem::Render { body, .. } => Some(body),
            _ => None,
        })
    }
}

fn print_item(w: &mut Writer, item: &ModuleItem) {
    match item {
        ModuleItem::Import(import) => {
            if import.specifiers.trim().is_empty() {
                w.line(&format!("import {};", js_string(&import.source)));
            } else {
                w.line(&format!(
                    "import {} from {};",
                    import.specifiers.trim(),
                    js_string(&import.source)
                ));
            }
        }
        ModuleItem::Statement(code) => w.block_text(code),
        ModuleItem::Const(declarators) => {
            let last = declarators.len().saturating_sub(1);
            for (i, (name, value)) in declarators.iter().enumerate() {
                let keyword = if i == 0 { "const " } else { "  " };
                let end = if i == last { ";" } else { "," };
                w.block_text(&format!("{}{} = {}{}", keyword, name, value, end));
            }
        }
        ModuleItem::ExportDefault(name) => w.line(&format!("export default {};", name)),
        ModuleItem::Assign { target, value } => {
            w.block_text(&format!("{} = {};", target, value))
        }
        ModuleItem::Render {
            target,
            renderer,
            params,
            body,
            options,
            component,
        } => {
            w.line(&format!(
                "{} = {}(function ({}) {{",
                target,
                renderer,
                params.join(", ")
            ));
            w.indent += 1;
            print_ops(w, body);
            w.indent -= 1;
            w.block_text(&format!("}}, {}, {});", options, component));
        }
    }
}

fn print_ops(w: &mut Writer, ops: &[RenderOp]) {
    for op in ops {
        match op {
            RenderOp::Write(text) => w.line(&format!("out.w({});", js_string(text))),
            RenderOp::Code(code) => w.block_text(code),
            RenderOp::Block { open, body, close } => {
                w.line(open);
                w.indent += 1;
                print_ops(w, body);
                w.indent -= 1;
                w.line(close);
            }
        }
    }
}

#[derive(Default)]
struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Multi-line text, every line at the current indentation.
    fn block_text(&mut self, text: &str) {
        for line in text.trim_end().lines() {
            if line.trim().is_empty() {
                self.out.push('\n');
            } else {
                self.line(line);
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}
