//! Render body extraction.
//!
//! Splits the top-level body into code that runs once when the module loads
//! and template content that runs on every render.

use crate::ir::{BodyItem, TemplateNode};

#[derive(Debug, Default)]
pub struct SplitBody {
    pub module_scope: Vec<BodyItem>,
    pub render_scope: Vec<TemplateNode>,
}

/// A top-level item belongs to the render function iff it is template
/// content not flagged static. Authored order is kept in both halves and
/// every item is moved exactly once.
pub fn split_render_body(body: Vec<BodyItem>) -> SplitBody {
    let mut split = SplitBody::default();
    for item in body {
        match item {
            BodyItem::Template(node) if !node.is_static() => split.render_scope.push(node),
            other => split.module_scope.push(other),
        }
    }
    split
}
