//! Node builders and fakes shared by the test modules.

use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::ir::*;

pub fn mock_loc() -> SourceLocation {
    SourceLocation { line: 1, column: 1 }
}

pub fn program(body: Vec<BodyItem>) -> Program {
    Program {
        body,
        module_code: None,
    }
}

pub fn import_decl(source: &str, specifiers: &str) -> BodyItem {
    BodyItem::Import(ImportDeclaration {
        source: source.to_string(),
        specifiers: specifiers.to_string(),
    })
}

pub fn statement(code: &str) -> BodyItem {
    BodyItem::Statement(ScriptStatement {
        code: code.to_string(),
    })
}

pub fn text(value: &str) -> TemplateNode {
    TemplateNode::Text(TextNode {
        value: value.to_string(),
        is_static: false,
        location: mock_loc(),
    })
}

pub fn placeholder(expression: &str) -> TemplateNode {
    TemplateNode::Placeholder(PlaceholderNode {
        expression: expression.to_string(),
        escape: true,
        is_static: false,
        location: mock_loc(),
    })
}

pub fn raw_placeholder(expression: &str) -> TemplateNode {
    TemplateNode::Placeholder(PlaceholderNode {
        expression: expression.to_string(),
        escape: false,
        is_static: false,
        location: mock_loc(),
    })
}

pub fn comment(value: &str) -> TemplateNode {
    TemplateNode::Comment(CommentNode {
        value: value.to_string(),
        is_static: false,
        location: mock_loc(),
    })
}

pub fn doctype(value: &str) -> TemplateNode {
    TemplateNode::DocumentType(DocumentTypeNode {
        value: value.to_string(),
        is_static: false,
        location: mock_loc(),
    })
}

pub fn scriptlet(code: &str) -> TemplateNode {
    TemplateNode::Scriptlet(ScriptletNode {
        code: code.to_string(),
        is_static: false,
        location: mock_loc(),
    })
}

pub fn static_scriptlet(code: &str) -> TemplateNode {
    TemplateNode::Scriptlet(ScriptletNode {
        code: code.to_string(),
        is_static: true,
        location: mock_loc(),
    })
}

pub fn class_block(code: &str) -> TemplateNode {
    TemplateNode::Class(ClassNode {
        code: code.to_string(),
        is_static: false,
        location: mock_loc(),
    })
}

pub fn attr(name: &str, value: &str) -> AttributeNode {
    AttributeNode {
        name: name.to_string(),
        value: value.to_string(),
    }
}

pub fn tag_node(name: &str, attributes: Vec<AttributeNode>, children: Vec<TemplateNode>) -> TagNode {
    TagNode {
        name: TagName::Static(name.to_string()),
        attributes,
        arguments: None,
        body: TagBody {
            params: vec![],
            children,
        },
        is_static: false,
        location: mock_loc(),
    }
}

pub fn tag(name: &str, attributes: Vec<AttributeNode>, children: Vec<TemplateNode>) -> TemplateNode {
    TemplateNode::Tag(tag_node(name, attributes, children))
}

/// A tag binding body parameters, e.g. `<list|item|>`.
pub fn tag_with_params(name: &str, params: &[&str], children: Vec<TemplateNode>) -> TemplateNode {
    let mut node = tag_node(name, vec![], children);
    node.body.params = params.iter().map(|p| p.to_string()).collect();
    TemplateNode::Tag(node)
}

pub fn tag_with_args(name: &str, arguments: &str, children: Vec<TemplateNode>) -> TemplateNode {
    let mut node = tag_node(name, vec![], children);
    node.arguments = Some(arguments.to_string());
    TemplateNode::Tag(node)
}

pub fn dynamic_tag(expression: &str, params: &[&str], children: Vec<TemplateNode>) -> TemplateNode {
    let mut node = tag_node("", vec![], children);
    node.name = TagName::Dynamic(expression.to_string());
    node.body.params = params.iter().map(|p| p.to_string()).collect();
    TemplateNode::Tag(node)
}

pub fn as_tag(node: &TemplateNode) -> &TagNode {
    match node {
        TemplateNode::Tag(tag) => tag,
        other => panic!("expected tag, got {:?}", other),
    }
}

/// In-memory directory listings that count how often they are read.
#[derive(Debug, Default)]
pub struct FakeFileSystem {
    dirs: HashMap<PathBuf, Vec<String>>,
    reads: Cell<usize>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, dir: &str, entries: &[&str]) -> Self {
        self.dirs.insert(
            PathBuf::from(dir),
            entries.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl FileSystem for FakeFileSystem {
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        self.reads.set(self.reads.get() + 1);
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }
}
