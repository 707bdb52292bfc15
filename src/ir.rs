//! Input IR for the translator.
//!
//! The external parser hands over a `Program`: an ordered body of plain
//! script items (imports, statements) interleaved with template nodes.
//! Everything here is serde-compatible so the tree can cross the native
//! binding boundary as JSON.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_EXPRESSION_SYNTAX: &str = "T-ERR-SYNTAX-001";
pub const ERR_MODULE_CODE_SYNTAX: &str = "T-ERR-SYNTAX-002";
pub const ERR_META_SERIALIZE: &str = "T-ERR-META-001";
pub const ERR_INVALID_INPUT: &str = "T-ERR-INPUT-001";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_EXPRESSION_SYNTAX => "Every expression emitted into the module parses as JavaScript.",
        ERR_MODULE_CODE_SYNTAX => {
            "A template compiled as plain module code is valid JavaScript on its own."
        }
        ERR_META_SERIALIZE => "Template metadata is emitted as a valid object literal.",
        ERR_INVALID_INPUT => "The translator only accepts well-formed program and option JSON.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(code, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        code: &str,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        CompilerError {
            code: code.to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    /// Attach the source position of the node being compiled.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.line = location.line;
        self.column = location.column;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRAM
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub body: Vec<BodyItem>,
    /// Set when the whole file is executable code rather than a template.
    #[serde(default)]
    pub module_code: Option<String>,
}

/// A top-level item. Template nodes carry a `type` tag, plain script items do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyItem {
    Template(TemplateNode),
    Import(ImportDeclaration),
    Statement(ScriptStatement),
}

impl From<TemplateNode> for BodyItem {
    fn from(node: TemplateNode) -> Self {
        BodyItem::Template(node)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportDeclaration {
    pub source: String,
    /// Raw specifier clause: `Foo`, `{ a, b as c }`, `* as ns`, or empty for side effects.
    #[serde(default)]
    pub specifiers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStatement {
    pub code: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    DocumentType(DocumentTypeNode),
    Declaration(DeclarationNode),
    Cdata(CdataNode),
    Tag(TagNode),
    Text(TextNode),
    Placeholder(PlaceholderNode),
    Comment(CommentNode),
    Scriptlet(ScriptletNode),
    Class(ClassNode),
}

impl TemplateNode {
    pub fn is_static(&self) -> bool {
        match self {
            TemplateNode::DocumentType(n) => n.is_static,
            TemplateNode::Declaration(n) => n.is_static,
            TemplateNode::Cdata(n) => n.is_static,
            TemplateNode::Tag(n) => n.is_static,
            TemplateNode::Text(n) => n.is_static,
            TemplateNode::Placeholder(n) => n.is_static,
            TemplateNode::Comment(n) => n.is_static,
            TemplateNode::Scriptlet(n) => n.is_static,
            TemplateNode::Class(n) => n.is_static,
        }
    }

    pub fn set_static(&mut self, value: bool) {
        match self {
            TemplateNode::DocumentType(n) => n.is_static = value,
            TemplateNode::Declaration(n) => n.is_static = value,
            TemplateNode::Cdata(n) => n.is_static = value,
            TemplateNode::Tag(n) => n.is_static = value,
            TemplateNode::Text(n) => n.is_static = value,
            TemplateNode::Placeholder(n) => n.is_static = value,
            TemplateNode::Comment(n) => n.is_static = value,
            TemplateNode::Scriptlet(n) => n.is_static = value,
            TemplateNode::Class(n) => n.is_static = value,
        }
    }

    /// Whether rendering this node writes anything to `out`.
    pub fn produces_output(&self) -> bool {
        !matches!(self, TemplateNode::Scriptlet(_) | TemplateNode::Class(_))
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            TemplateNode::DocumentType(n) => n.location,
            TemplateNode::Declaration(n) => n.location,
            TemplateNode::Cdata(n) => n.location,
            TemplateNode::Tag(n) => n.location,
            TemplateNode::Text(n) => n.location,
            TemplateNode::Placeholder(n) => n.location,
            TemplateNode::Comment(n) => n.location,
            TemplateNode::Scriptlet(n) => n.location,
            TemplateNode::Class(n) => n.location,
        }
    }
}

/// `<!DOCTYPE html>` with `value` holding `DOCTYPE html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeNode {
    pub value: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

/// `<?xml version="1.0"?>` with `value` holding the inner text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationNode {
    pub value: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdataNode {
    pub value: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum TagName {
    Static(String),
    /// JavaScript expression evaluated at render time (`<${expr}/>`).
    Dynamic(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeNode {
    pub name: String,
    /// JavaScript expression source.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagBody {
    /// Body parameters (`<for|item| of=list>`).
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNode {
    pub name: TagName,
    #[serde(default)]
    pub attributes: Vec<AttributeNode>,
    /// Tag arguments (`<if(cond)>`).
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub body: TagBody,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

impl TagNode {
    pub fn static_name(&self) -> Option<&str> {
        match &self.name {
            TagName::Static(name) => Some(name.as_str()),
            TagName::Dynamic(_) => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.name, TagName::Dynamic(_))
    }

    /// Attribute tags address a named slot on their parent (`<@header>`).
    pub fn is_attribute_tag(&self) -> bool {
        self.static_name().is_some_and(|name| name.starts_with('@'))
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

fn default_escape() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderNode {
    pub expression: String,
    /// `${expr}` escapes, `$!{expr}` writes raw.
    #[serde(default = "default_escape")]
    pub escape: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub value: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

/// `$ code` runs per render; `static code` is authored with `static: true` and runs once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptletNode {
    pub code: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Inline component class, `code` holds the full `class { ... }` expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNode {
    pub code: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}
