//! Static/dynamic classification.
//!
//! A single bottom-up pass that sets the `static` flag on every template
//! node. Nested constant subtrees are flagged so lowering can fold them into
//! one precomputed write. At the top level only module-scope content
//! (static scriptlets and class blocks) stays flagged: anything that writes
//! output has to run on every render.

use log::trace;
use std::path::Path;

use crate::ir::{
    BodyItem, CdataNode, ClassNode, CommentNode, DeclarationNode, DocumentTypeNode,
    PlaceholderNode, Program, ScriptletNode, TagNode, TextNode,
};
use crate::registry::TagRegistry;
use crate::script::literal_value;
use crate::visitor::{walk_tag, TemplateVisitor};

struct Classifier<'r> {
    registry: &'r dyn TagRegistry,
    from: &'r Path,
}

impl Classifier<'_> {
    fn tag_is_static(&self, tag: &TagNode) -> bool {
        let Some(name) = tag.static_name() else {
            return false;
        };
        !tag.is_attribute_tag()
            && self.registry.is_native(self.from, name)
            && tag.arguments.is_none()
            && tag.body.params.is_empty()
            && tag
                .attributes
                .iter()
                .all(|attr| literal_value(&attr.value).is_some())
            && tag.body.children.iter().all(|child| child.is_static())
    }
}

impl TemplateVisitor for Classifier<'_> {
    fn visit_tag(&mut self, tag: &mut TagNode) {
        walk_tag(self, tag);
        tag.is_static = self.tag_is_static(tag);
    }

    fn visit_text(&mut self, text: &mut TextNode) {
        text.is_static = true;
    }

    fn visit_placeholder(&mut self, placeholder: &mut PlaceholderNode) {
        placeholder.is_static = literal_value(&placeholder.expression).is_some();
    }

    fn visit_comment(&mut self, comment: &mut CommentNode) {
        comment.is_static = true;
    }

    fn visit_document_type(&mut self, doctype: &mut DocumentTypeNode) {
        doctype.is_static = true;
    }

    fn visit_declaration(&mut self, declaration: &mut DeclarationNode) {
        declaration.is_static = true;
    }

    fn visit_cdata(&mut self, cdata: &mut CdataNode) {
        cdata.is_static = true;
    }

    // Scriptlets keep the flag they were authored with.
    fn visit_scriptlet(&mut self, _scriptlet: &mut ScriptletNode) {}

    fn visit_class(&mut self, class: &mut ClassNode) {
        class.is_static = true;
    }
}

/// Set the `static` flag on every template node of `program`.
pub fn classify(program: &mut Program, registry: &dyn TagRegistry, from: &Path) {
    let mut classifier = Classifier { registry, from };
    classifier.visit_program(program);

    for item in &mut program.body {
        if let BodyItem::Template(node) = item {
            if node.produces_output() && node.is_static() {
                trace!(
                    "[Translator] Top-level node at {:?} stays in render scope",
                    node.location()
                );
                node.set_static(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TemplateNode;
    use crate::registry::{StaticTagRegistry, TagDefinition};
    use crate::test_support::*;

    fn run(body: Vec<BodyItem>) -> Program {
        let registry = StaticTagRegistry::new()
            .with(TagDefinition::template("card", "/app/components/card.marko"));
        let mut program = program(body);
        classify(&mut program, &registry, Path::new("/app/page.marko"));
        program
    }

    fn nested(program: &Program, index: usize) -> &[TemplateNode] {
        match &program.body[index] {
            BodyItem::Template(TemplateNode::Tag(tag)) => &tag.body.children,
            other => panic!("expected tag, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_output_is_never_static() {
        let program = run(vec![
            static_scriptlet("const a = 1;").into(),
            text("hi").into(),
            placeholder("'constant'").into(),
        ]);
        let flags: Vec<bool> = program
            .body
            .iter()
            .map(|item| match item {
                BodyItem::Template(node) => node.is_static(),
                _ => false,
            })
            .collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_nested_constant_subtree_is_static() {
        let program = run(vec![tag(
            "div",
            vec![],
            vec![
                tag("span", vec![attr("class", "'x'")], vec![text("a")]).into(),
                placeholder("input.name").into(),
                tag("p", vec![attr("id", "input.id")], vec![]).into(),
                tag("card", vec![], vec![]).into(),
            ],
        )
        .into()]);

        let flags: Vec<bool> = nested(&program, 0).iter().map(|n| n.is_static()).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_dynamic_descendant_taints_ancestor() {
        let program = run(vec![tag(
            "div",
            vec![],
            vec![tag("ul", vec![], vec![tag("li", vec![], vec![placeholder("x").into()]).into()])
                .into()],
        )
        .into()]);
        assert!(!nested(&program, 0)[0].is_static());
    }
}
