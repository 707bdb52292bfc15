//! Per-node lowering.
//!
//! Every template node in render scope is handed to a [`NodeLowering`]
//! together with the shared [`LoweringContext`] and turned into render
//! operations. Each trait method defaults to the standard handler for its
//! node kind, so a custom lowering only overrides what it changes.

use log::{debug, trace, warn};
use std::collections::HashMap;

use crate::ir::{
    CdataNode, ClassNode, CommentNode, CompilerError, DeclarationNode, DocumentTypeNode,
    PlaceholderNode, ScriptletNode, TagName, TagNode, TemplateNode, TextNode,
};
use crate::options::TranslateOptions;
use crate::output::{js_key, js_string, ImportRegistry, RenderOp};
use crate::paths::resolve_relative_path;
use crate::registry::{TagRegistry, VOID_TAGS};
use crate::script::{literal_value, parse_expression_fragment, Literal};
use crate::unit::CompilationUnit;

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// File-wide state shared by all lowering handlers of one compile.
pub struct LoweringContext<'a> {
    pub unit: &'a mut CompilationUnit,
    pub options: &'a TranslateOptions,
    pub imports: &'a mut ImportRegistry,
    pub registry: &'a dyn TagRegistry,
    /// Render function parameter holding the component definition.
    pub component_def: String,
    /// Source of the last class block seen.
    pub inline_component: Option<String>,
    next_key: usize,
    macros: HashMap<String, String>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(
        unit: &'a mut CompilationUnit,
        options: &'a TranslateOptions,
        imports: &'a mut ImportRegistry,
        registry: &'a dyn TagRegistry,
        component_def: String,
    ) -> Self {
        Self {
            unit,
            options,
            imports,
            registry,
            component_def,
            inline_component: None,
            next_key: 0,
            macros: HashMap::new(),
        }
    }

    pub fn is_html(&self) -> bool {
        self.unit.output.is_html()
    }

    /// Key identifying a nested component within this template.
    pub fn next_key(&mut self) -> String {
        let key = self.next_key.to_string();
        self.next_key += 1;
        key
    }

    fn escape_xml(&mut self) -> String {
        let source = self.options.runtime.escape_xml.clone();
        self.imports
            .import_named(self.unit, &source, "x", "marko_escapeXml")
    }

    fn to_string_helper(&mut self) -> String {
        let source = self.options.runtime.to_string.clone();
        self.imports
            .import_default(self.unit, &source, "marko_to_string")
    }

    fn attr_helper(&mut self) -> String {
        let source = self.options.runtime.attr.clone();
        self.imports.import_default(self.unit, &source, "marko_attr")
    }

    fn render_tag_helper(&mut self) -> String {
        let source = self.options.runtime.render_tag.clone();
        self.imports
            .import_default(self.unit, &source, "marko_renderTag")
    }

    fn dynamic_tag_helper(&mut self) -> String {
        let source = self.options.runtime.dynamic_tag.clone();
        self.imports
            .import_default(self.unit, &source, "marko_dynamicTag")
    }

    fn macro_ident(&mut self, name: &str) -> String {
        if let Some(ident) = self.macros.get(name) {
            return ident.clone();
        }
        let ident = self.unit.generate_uid(name);
        self.macros.insert(name.to_string(), ident.clone());
        ident
    }

    fn check_expression(&self, code: &str, tag: &TagNode) -> Result<(), CompilerError> {
        parse_expression_fragment(&self.unit.file_name(), code).map_err(|e| e.at(tag.location))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

pub trait NodeLowering {
    fn lower_children(
        &self,
        cx: &mut LoweringContext,
        nodes: Vec<TemplateNode>,
    ) -> Result<Vec<RenderOp>, CompilerError> {
        let mut ops = Vec::new();
        for node in nodes {
            self.lower_node(cx, node, &mut ops)?;
        }
        Ok(ops)
    }

    fn lower_node(
        &self,
        cx: &mut LoweringContext,
        node: TemplateNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        match node {
            TemplateNode::DocumentType(n) => self.lower_document_type(cx, n, ops),
            TemplateNode::Declaration(n) => self.lower_declaration(cx, n, ops),
            TemplateNode::Cdata(n) => self.lower_cdata(cx, n, ops),
            TemplateNode::Tag(n) => self.lower_tag(cx, n, ops),
            TemplateNode::Text(n) => self.lower_text(cx, n, ops),
            TemplateNode::Placeholder(n) => self.lower_placeholder(cx, n, ops),
            TemplateNode::Comment(n) => self.lower_comment(cx, n, ops),
            TemplateNode::Scriptlet(n) => self.lower_scriptlet(cx, n, ops),
            TemplateNode::Class(n) => self.lower_class(cx, n, ops),
        }
    }

    fn lower_document_type(
        &self,
        cx: &mut LoweringContext,
        node: DocumentTypeNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if cx.is_html() {
            ops.push(RenderOp::write(format!("<!{}>", node.value)));
        } else {
            trace!("[Translator] Dropping doctype in tree output");
        }
        Ok(())
    }

    fn lower_declaration(
        &self,
        cx: &mut LoweringContext,
        node: DeclarationNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if cx.is_html() {
            ops.push(RenderOp::write(format!("<?{}?>", node.value)));
        } else {
            trace!("[Translator] Dropping declaration in tree output");
        }
        Ok(())
    }

    fn lower_cdata(
        &self,
        cx: &mut LoweringContext,
        node: CdataNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if cx.is_html() {
            ops.push(RenderOp::write(format!("<![CDATA[{}]]>", node.value)));
        } else {
            ops.push(RenderOp::code(format!(
                "out.t({}, {});",
                js_string(&node.value),
                cx.component_def
            )));
        }
        Ok(())
    }

    fn lower_tag(
        &self,
        cx: &mut LoweringContext,
        node: TagNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        lower_tag_default(self, cx, node, ops)
    }

    fn lower_text(
        &self,
        cx: &mut LoweringContext,
        node: TextNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if node.value.is_empty() {
            return Ok(());
        }
        if cx.is_html() {
            ops.push(RenderOp::write(escape_xml_text(&node.value)));
        } else {
            ops.push(RenderOp::code(format!(
                "out.t({}, {});",
                js_string(&node.value),
                cx.component_def
            )));
        }
        Ok(())
    }

    fn lower_placeholder(
        &self,
        cx: &mut LoweringContext,
        node: PlaceholderNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if let Some(literal) = literal_value(&node.expression) {
            let text = literal.render_text();
            if text.is_empty() {
                return Ok(());
            }
            if !cx.is_html() {
                ops.push(RenderOp::code(format!(
                    "out.t({}, {});",
                    js_string(&text),
                    cx.component_def
                )));
            } else if node.escape {
                ops.push(RenderOp::write(escape_xml_text(&text)));
            } else {
                ops.push(RenderOp::write(text));
            }
            return Ok(());
        }

        let code = match (cx.is_html(), node.escape) {
            (true, true) => format!("out.w({}({}));", cx.escape_xml(), node.expression),
            (true, false) => format!("out.w({}({}));", cx.to_string_helper(), node.expression),
            (false, true) => format!("out.t({}, {});", node.expression, cx.component_def),
            (false, false) => format!("out.h({}, {});", node.expression, cx.component_def),
        };
        ops.push(RenderOp::code(code));
        Ok(())
    }

    fn lower_comment(
        &self,
        cx: &mut LoweringContext,
        node: CommentNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if !cx.options.preserve_comments {
            return Ok(());
        }
        if cx.is_html() {
            ops.push(RenderOp::write(format!("<!--{}-->", node.value)));
        } else {
            ops.push(RenderOp::code(format!(
                "out.comment({}, {});",
                js_string(&node.value),
                cx.component_def
            )));
        }
        Ok(())
    }

    fn lower_scriptlet(
        &self,
        _cx: &mut LoweringContext,
        node: ScriptletNode,
        ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        let code = node.code.trim();
        if !code.is_empty() {
            ops.push(RenderOp::code(code));
        }
        Ok(())
    }

    fn lower_class(
        &self,
        cx: &mut LoweringContext,
        node: ClassNode,
        _ops: &mut Vec<RenderOp>,
    ) -> Result<(), CompilerError> {
        if cx.inline_component.is_some() {
            debug!(
                "[Translator] Multiple class blocks in {}, keeping the last",
                cx.unit.file_name()
            );
        }
        cx.inline_component = Some(node.code.trim().to_string());
        Ok(())
    }
}

/// The standard handlers for both output modes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardLowering;

impl NodeLowering for StandardLowering {}

// ═══════════════════════════════════════════════════════════════════════════════
// TAGS
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_tag_default<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let name = match &tag.name {
        TagName::Dynamic(expr) => {
            let expr = expr.clone();
            return lower_dynamic_tag(lowering, cx, expr, tag, ops);
        }
        TagName::Static(name) => name.clone(),
    };

    if tag.is_attribute_tag() {
        warn!(
            "[Translator] <{}> at {:?} is not inside a custom tag and was dropped",
            name, tag.location
        );
        return Ok(());
    }

    match name.as_str() {
        "if" | "else-if" | "else" => return lower_conditional(lowering, cx, &name, tag, ops),
        "for" => return lower_loop(lowering, cx, tag, ops),
        "macro" => return lower_macro_definition(lowering, cx, tag, ops),
        _ => {}
    }

    if cx.unit.meta().macros.contains(&name) {
        let ident = cx.macro_ident(&name);
        let input = build_input(lowering, cx, tag, &name, ops)?;
        ops.push(RenderOp::code(format!("{}(out, {});", ident, input)));
        return Ok(());
    }

    if cx.registry.is_native(cx.unit.path(), &name) {
        return if cx.is_html() {
            lower_native_html(lowering, cx, &name, tag, ops)
        } else {
            lower_native_dom(lowering, cx, &name, tag, ops)
        };
    }

    let entry = cx
        .registry
        .lookup(cx.unit.path(), &name)
        .and_then(|def| def.entry().map(|p| p.to_string_lossy().to_string()));
    match entry {
        Some(entry) => lower_custom_tag(lowering, cx, &name, &entry, tag, ops),
        None => {
            debug!(
                "[Translator] <{}> is not a known tag, rendering it dynamically",
                name
            );
            lower_dynamic_tag(lowering, cx, js_string(&name), tag, ops)
        }
    }
}

fn lower_native_html<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    name: &str,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    if tag.is_static {
        let mut markup = String::new();
        static_tag_markup(&tag, cx.options.preserve_comments, &mut markup);
        ops.push(RenderOp::Write(markup));
        return Ok(());
    }

    ops.push(RenderOp::write(format!("<{}", name)));
    for attr in &tag.attributes {
        match literal_value(&attr.value) {
            Some(literal) => {
                let folded = static_attr(&attr.name, &literal);
                if !folded.is_empty() {
                    ops.push(RenderOp::Write(folded));
                }
            }
            None => {
                cx.check_expression(&attr.value, &tag)?;
                let helper = cx.attr_helper();
                ops.push(RenderOp::code(format!(
                    "out.w({}({}, {}));",
                    helper,
                    js_string(&attr.name),
                    attr.value
                )));
            }
        }
    }
    ops.push(RenderOp::write(">"));

    if VOID_TAGS.contains(name) {
        if !tag.body.children.is_empty() {
            warn!("[Translator] Ignoring content of void element <{}>", name);
        }
        return Ok(());
    }

    ops.extend(lowering.lower_children(cx, tag.body.children)?);
    ops.push(RenderOp::write(format!("</{}>", name)));
    Ok(())
}

fn lower_native_dom<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    name: &str,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let attrs = if tag.attributes.is_empty() {
        "null".to_string()
    } else {
        let props: Vec<String> = tag
            .attributes
            .iter()
            .map(|attr| format!("{}: {}", js_key(&attr.name), attr.value))
            .collect();
        let object = format!("{{ {} }}", props.join(", "));
        cx.check_expression(&object, &tag)?;
        object
    };

    let key = cx.next_key();
    ops.push(RenderOp::code(format!(
        "out.be({}, {}, {}, {});",
        js_string(name),
        attrs,
        js_string(&key),
        cx.component_def
    )));
    ops.extend(lowering.lower_children(cx, tag.body.children)?);
    ops.push(RenderOp::code("out.ee();"));
    Ok(())
}

fn lower_custom_tag<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    name: &str,
    entry: &str,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let request = resolve_relative_path(cx.unit.path(), entry);
    cx.unit.meta_mut().add_tag(&request);
    let template = cx.imports.import_default(cx.unit, &request, name);

    let input = build_input(lowering, cx, tag, name, ops)?;
    let helper = cx.render_tag_helper();
    let key = cx.next_key();
    ops.push(RenderOp::code(format!(
        "{}({}, {}, out, {}, {});",
        helper,
        template,
        input,
        cx.component_def,
        js_string(&key)
    )));
    Ok(())
}

fn lower_dynamic_tag<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    target: String,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    cx.check_expression(&target, &tag)?;
    let input = build_input(lowering, cx, tag, "dynamic", ops)?;
    let helper = cx.dynamic_tag_helper();
    let key = cx.next_key();
    ops.push(RenderOp::code(format!(
        "{}(out, {}, () => {}, {}, {});",
        helper,
        target,
        input,
        cx.component_def,
        js_string(&key)
    )));
    Ok(())
}

/// Declare the input object of a tag invocation and return its name.
///
/// Attributes become properties. Attribute tags become nested input objects
/// under their slot name, an array when the slot repeats. Remaining content
/// becomes `renderBody`.
fn build_input<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    tag: TagNode,
    hint: &str,
    ops: &mut Vec<RenderOp>,
) -> Result<String, CompilerError> {
    let var = cx.unit.generate_uid(&format!("{}_input", hint));

    let props: Vec<String> = tag
        .attributes
        .iter()
        .map(|attr| format!("{}: {}", js_key(&attr.name), attr.value))
        .collect();
    let object = if props.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", props.join(", "))
    };
    cx.check_expression(&object, &tag)?;
    ops.push(RenderOp::code(format!("const {} = {};", var, object)));

    let mut slots: Vec<(String, Vec<TagNode>)> = Vec::new();
    let mut content = Vec::new();
    for child in tag.body.children {
        match child {
            TemplateNode::Tag(child) if child.is_attribute_tag() => {
                let slot = child
                    .static_name()
                    .map(|n| n.trim_start_matches('@').to_string())
                    .unwrap_or_default();
                match slots.iter_mut().find(|(name, _)| *name == slot) {
                    Some((_, tags)) => tags.push(child),
                    None => slots.push((slot, vec![child])),
                }
            }
            other => content.push(other),
        }
    }

    for (slot, tags) in slots {
        let mut values = Vec::with_capacity(tags.len());
        for attr_tag in tags {
            values.push(build_input(lowering, cx, attr_tag, &slot, ops)?);
        }
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            format!("[{}]", values.join(", "))
        };
        ops.push(RenderOp::code(format!("{} = {};", member(&var, &slot), value)));
    }

    if !content.is_empty() {
        let params = std::iter::once("out".to_string())
            .chain(tag.body.params.iter().cloned())
            .collect::<Vec<_>>()
            .join(", ");
        let body = lowering.lower_children(cx, content)?;
        ops.push(RenderOp::Block {
            open: format!("{} = ({}) => {{", member(&var, "renderBody"), params),
            body,
            close: "};".to_string(),
        });
    }

    Ok(var)
}

fn member(object: &str, property: &str) -> String {
    let key = js_key(property);
    if key == property {
        format!("{}.{}", object, property)
    } else {
        format!("{}[{}]", object, key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CORE TAGS
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_conditional<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    name: &str,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let open = if name == "else" {
        "else {".to_string()
    } else {
        let condition = match tag.arguments.as_deref().map(str::trim) {
            Some(condition) if !condition.is_empty() => condition.to_string(),
            _ => {
                warn!("[Translator] <{}> without a condition at {:?}", name, tag.location);
                "undefined".to_string()
            }
        };
        cx.check_expression(&condition, &tag)?;
        let keyword = if name == "if" { "if" } else { "else if" };
        format!("{} ({}) {{", keyword, condition)
    };

    let body = lowering.lower_children(cx, tag.body.children)?;
    ops.push(RenderOp::Block {
        open,
        body,
        close: "}".to_string(),
    });
    Ok(())
}

fn lower_loop<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let mut params = tag.body.params.clone();
    let value_of = |name: &str| tag.attribute(name).map(|a| a.value.clone());

    let open = if let Some(list) = value_of("of") {
        cx.check_expression(&list, &tag)?;
        if params.len() >= 2 {
            let index = params.remove(1);
            format!(
                "for (const [{}, {}] of Array.from({}).entries()) {{",
                index, params[0], list
            )
        } else {
            let item = params.pop().unwrap_or_else(|| cx.unit.generate_uid("item"));
            format!("for (const {} of {}) {{", item, list)
        }
    } else if let Some(object) = value_of("in") {
        cx.check_expression(&object, &tag)?;
        let key = params.first().cloned().unwrap_or_else(|| cx.unit.generate_uid("key"));
        let value = params.get(1).cloned().unwrap_or_else(|| cx.unit.generate_uid("value"));
        format!("for (const [{}, {}] of Object.entries({})) {{", key, value, object)
    } else if let (Some(from), Some(to)) = (value_of("from"), value_of("to")) {
        let step = value_of("step").unwrap_or_else(|| "1".to_string());
        for bound in [&from, &to, &step] {
            cx.check_expression(bound, &tag)?;
        }
        let i = params.first().cloned().unwrap_or_else(|| cx.unit.generate_uid("i"));
        let test = match literal_value(&step) {
            Some(Literal::Number(n)) if n < 0.0 => format!("{} >= {}", i, to),
            Some(Literal::Number(_)) => format!("{} <= {}", i, to),
            _ => format!("({}) > 0 ? {i} <= {to} : {i} >= {to}", step, i = i, to = to),
        };
        format!(
            "for (let {i} = {from}; {test}; {i} += {step}) {{",
            i = i,
            from = from,
            test = test,
            step = step
        )
    } else {
        warn!(
            "[Translator] <for> at {:?} needs of=, in= or from=/to=, rendering its body once",
            tag.location
        );
        ops.extend(lowering.lower_children(cx, tag.body.children)?);
        return Ok(());
    };

    let body = lowering.lower_children(cx, tag.body.children)?;
    ops.push(RenderOp::Block {
        open,
        body,
        close: "}".to_string(),
    });
    Ok(())
}

fn lower_macro_definition<L: NodeLowering + ?Sized>(
    lowering: &L,
    cx: &mut LoweringContext,
    tag: TagNode,
    ops: &mut Vec<RenderOp>,
) -> Result<(), CompilerError> {
    let name = match tag.attribute("name").and_then(|a| literal_value(&a.value)) {
        Some(Literal::String(name)) => name,
        _ => {
            warn!("[Translator] <macro> at {:?} has no literal name", tag.location);
            return Ok(());
        }
    };

    let ident = cx.macro_ident(&name);
    let params = std::iter::once("out".to_string())
        .chain(tag.body.params.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ");
    let body = lowering.lower_children(cx, tag.body.children)?;
    ops.push(RenderOp::Block {
        open: format!("function {}({}) {{", ident, params),
        body,
        close: "}".to_string(),
    });
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP
// ═══════════════════════════════════════════════════════════════════════════════

pub fn escape_xml_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_xml_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// ` name="value"`, ` name` for `true`, nothing for `false`/`null`/`undefined`.
fn static_attr(name: &str, value: &Literal) -> String {
    match value {
        Literal::Bool(false) | Literal::Null | Literal::Undefined => String::new(),
        Literal::Bool(true) => format!(" {}", name),
        other => format!(" {}=\"{}\"", name, escape_xml_attr(&other.render_text())),
    }
}

/// Render a constant subtree at compile time.
fn static_tag_markup(tag: &TagNode, preserve_comments: bool, out: &mut String) {
    let name = tag.static_name().unwrap_or_default();
    out.push('<');
    out.push_str(name);
    for attr in &tag.attributes {
        if let Some(value) = literal_value(&attr.value) {
            out.push_str(&static_attr(&attr.name, &value));
        }
    }
    out.push('>');
    if VOID_TAGS.contains(name) {
        return;
    }

    for child in &tag.body.children {
        match child {
            TemplateNode::Tag(child) => static_tag_markup(child, preserve_comments, out),
            TemplateNode::Text(text) => out.push_str(&escape_xml_text(&text.value)),
            TemplateNode::Placeholder(p) => {
                if let Some(value) = literal_value(&p.expression) {
                    let text = value.render_text();
                    if p.escape {
                        out.push_str(&escape_xml_text(&text));
                    } else {
                        out.push_str(&text);
                    }
                }
            }
            TemplateNode::Comment(c) if preserve_comments => {
                out.push_str(&format!("<!--{}-->", c.value))
            }
            TemplateNode::Cdata(c) => out.push_str(&format!("<![CDATA[{}]]>", c.value)),
            TemplateNode::DocumentType(d) => out.push_str(&format!("<!{}>", d.value)),
            TemplateNode::Declaration(d) => out.push_str(&format!("<?{}?>", d.value)),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
