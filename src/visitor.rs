use crate::ir::{
    BodyItem, CdataNode, ClassNode, CommentNode, DeclarationNode, DocumentTypeNode,
    PlaceholderNode, Program, ScriptletNode, TagNode, TemplateNode, TextNode,
};

/// The TemplateVisitor trait is the shared traversal for template trees.
///
/// Rules:
/// 1. Children are visited in authored order.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers call the matching `walk_*` function to continue traversal unless pruning is intended.
pub trait TemplateVisitor {
    fn visit_program(&mut self, program: &mut Program) {
        walk_program(self, program);
    }

    fn visit_node(&mut self, node: &mut TemplateNode) {
        walk_node(self, node);
    }

    fn visit_tag(&mut self, tag: &mut TagNode) {
        walk_tag(self, tag);
    }

    fn visit_children(&mut self, children: &mut Vec<TemplateNode>) {
        walk_children(self, children);
    }

    fn visit_text(&mut self, _text: &mut TextNode) {}

    fn visit_placeholder(&mut self, _placeholder: &mut PlaceholderNode) {}

    fn visit_comment(&mut self, _comment: &mut CommentNode) {}

    fn visit_document_type(&mut self, _doctype: &mut DocumentTypeNode) {}

    fn visit_declaration(&mut self, _declaration: &mut DeclarationNode) {}

    fn visit_cdata(&mut self, _cdata: &mut CdataNode) {}

    fn visit_scriptlet(&mut self, _scriptlet: &mut ScriptletNode) {}

    fn visit_class(&mut self, _class: &mut ClassNode) {}
}

pub fn walk_program<V: TemplateVisitor + ?Sized>(visitor: &mut V, program: &mut Program) {
    for item in &mut program.body {
        if let BodyItem::Template(node) = item {
            visitor.visit_node(node);
        }
    }
}

pub fn walk_children<V: TemplateVisitor + ?Sized>(
    visitor: &mut V,
    children: &mut Vec<TemplateNode>,
) {
    for node in children {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: TemplateVisitor + ?Sized>(visitor: &mut V, node: &mut TemplateNode) {
    match node {
        TemplateNode::Tag(tag) => visitor.visit_tag(tag),
        TemplateNode::Text(t) => visitor.visit_text(t),
        TemplateNode::Placeholder(p) => visitor.visit_placeholder(p),
        TemplateNode::Comment(c) => visitor.visit_comment(c),
        TemplateNode::DocumentType(d) => visitor.visit_document_type(d),
        TemplateNode::Declaration(d) => visitor.visit_declaration(d),
        TemplateNode::Cdata(c) => visitor.visit_cdata(c),
        TemplateNode::Scriptlet(s) => visitor.visit_scriptlet(s),
        TemplateNode::Class(c) => visitor.visit_class(c),
    }
}

pub fn walk_tag<V: TemplateVisitor + ?Sized>(visitor: &mut V, tag: &mut TagNode) {
    visitor.visit_children(&mut tag.body.children);
}

/// Read-only walk over every tag in authored order, handing each one its
/// enclosing tags (innermost last).
pub fn for_each_tag<'a, F>(nodes: &'a [TemplateNode], f: &mut F)
where
    F: FnMut(&'a TagNode, &[&'a TagNode]),
{
    let mut ancestors = Vec::new();
    for_each_tag_inner(nodes, &mut ancestors, f);
}

fn for_each_tag_inner<'a, F>(nodes: &'a [TemplateNode], ancestors: &mut Vec<&'a TagNode>, f: &mut F)
where
    F: FnMut(&'a TagNode, &[&'a TagNode]),
{
    for node in nodes {
        if let TemplateNode::Tag(tag) = node {
            f(tag, ancestors.as_slice());
            ancestors.push(tag);
            for_each_tag_inner(&tag.body.children, ancestors, f);
            ancestors.pop();
        }
    }
}
