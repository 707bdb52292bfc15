//! Stateful Capture Analysis Tests
//!
//! - Early negatives: native tags, macros, tags without body parameters
//! - Dynamic tags are assumed to capture
//! - Owning-tag resolution through attribute tag chains
//! - File-level memo: first `true` wins, unresolved files leave no memo

#[cfg(test)]
mod tests {
    use crate::analyze::{analyze_program, find_owning_tag, has_stateful_capture, TagFiles};
    use crate::ir::{BodyItem, TagNode};
    use crate::options::OutputMode;
    use crate::registry::{StaticTagRegistry, TagDefinition, TagRegistry};
    use crate::test_support::*;
    use crate::unit::{CompilationUnit, FileSummary, StatefulCapture};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct FakeFiles {
        registry: StaticTagRegistry,
        summaries: HashMap<PathBuf, FileSummary>,
        summary_requests: usize,
    }

    impl FakeFiles {
        fn with_template(mut self, name: &str, summary: Option<FileSummary>) -> Self {
            let path = PathBuf::from(format!("/app/components/{}.marko", name));
            self.registry.insert(TagDefinition::template(name, &path));
            if let Some(summary) = summary {
                self.summaries.insert(path, summary);
            }
            self
        }
    }

    impl TagFiles for FakeFiles {
        fn lookup_tag(&self, from: &Path, name: &str) -> Option<TagDefinition> {
            self.registry.lookup(from, name)
        }

        fn is_native_tag(&self, from: &Path, name: &str) -> bool {
            self.registry.is_native(from, name)
        }

        fn file_summary(&mut self, template: &Path) -> Option<FileSummary> {
            self.summary_requests += 1;
            self.summaries.get(template).copied()
        }
    }

    fn stateful_component() -> Option<FileSummary> {
        Some(FileSummary {
            has_stateful_capture: false,
            has_component: true,
            has_component_browser: false,
        })
    }

    fn split_component() -> Option<FileSummary> {
        Some(FileSummary {
            has_stateful_capture: false,
            has_component: true,
            has_component_browser: true,
        })
    }

    fn unit() -> CompilationUnit {
        CompilationUnit::new("/app/page.marko", OutputMode::html())
    }

    fn check(unit: &mut CompilationUnit, files: &mut FakeFiles, node: &crate::ir::TemplateNode) -> bool {
        has_stateful_capture(unit, as_tag(node), &[], files)
    }

    #[test]
    fn test_early_negatives_leave_no_memo() {
        let mut files = FakeFiles::default().with_template("list", stateful_component());
        let mut unit = unit();
        unit.meta_mut().macros.insert("row".to_string());

        assert!(!check(&mut unit, &mut files, &tag_with_params("div", &["x"], vec![])));
        assert!(!check(&mut unit, &mut files, &tag_with_params("row", &["x"], vec![])));
        assert!(!check(&mut unit, &mut files, &tag("list", vec![], vec![])));

        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Unknown);
        assert_eq!(files.summary_requests, 0);
    }

    #[test]
    fn test_dynamic_tag_with_params_captures() {
        let mut files = FakeFiles::default();
        let mut unit = unit();

        assert!(check(&mut unit, &mut files, &dynamic_tag("input.renderer", &["item"], vec![])));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_component_without_browser_split_captures() {
        let mut files = FakeFiles::default()
            .with_template("list", stateful_component())
            .with_template("grid", split_component());
        let mut unit = unit();

        assert!(!check(&mut unit, &mut files, &tag_with_params("grid", &["cell"], vec![])));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::No);

        assert!(check(&mut unit, &mut files, &tag_with_params("list", &["item"], vec![])));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_memo_is_monotonic_and_short_circuits() {
        let mut files = FakeFiles::default()
            .with_template("list", stateful_component())
            .with_template("grid", split_component());
        let mut unit = unit();

        assert!(check(&mut unit, &mut files, &tag_with_params("list", &["item"], vec![])));
        let requests = files.summary_requests;

        // A tag that alone would be safe still reports the file-level answer.
        assert!(check(&mut unit, &mut files, &tag_with_params("grid", &["cell"], vec![])));
        assert_eq!(files.summary_requests, requests);
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_transitive_capture_from_child_file() {
        let mut files = FakeFiles::default().with_template(
            "wrapper",
            Some(FileSummary {
                has_stateful_capture: true,
                has_component: false,
                has_component_browser: false,
            }),
        );
        let mut unit = unit();

        assert!(check(&mut unit, &mut files, &tag_with_params("wrapper", &["x"], vec![])));
    }

    #[test]
    fn test_unloadable_file_leaves_no_memo() {
        let mut files = FakeFiles::default().with_template("lazy", None);
        let mut unit = unit();

        assert!(!check(&mut unit, &mut files, &tag_with_params("lazy", &["x"], vec![])));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Unknown);
        assert_eq!(files.summary_requests, 1);
    }

    #[test]
    fn test_attribute_tag_chain_resolves_to_first_plain_ancestor() {
        let root = tag_node("list", vec![], vec![]);
        let a = tag_node("@section", vec![], vec![]);
        let b = tag_node("@group", vec![], vec![]);
        let c = tag_node("@item", vec![], vec![]);
        let leaf = tag_node("@cell", vec![], vec![]);

        let ancestors: Vec<&TagNode> = vec![&root, &a, &b, &c];
        let owner = find_owning_tag(&leaf, &ancestors).unwrap();
        assert_eq!(owner.static_name(), Some("list"));

        let plain = tag_node("span", vec![], vec![]);
        assert_eq!(
            find_owning_tag(&plain, &ancestors).and_then(|t| t.static_name()),
            Some("span")
        );

        let orphan_ancestors: Vec<&TagNode> = vec![&a, &b];
        assert!(find_owning_tag(&leaf, &orphan_ancestors).is_none());
    }

    #[test]
    fn test_attribute_tag_params_use_owner_file() {
        let mut files = FakeFiles::default().with_template("list", stateful_component());
        let mut unit = unit();

        let root = tag_node("list", vec![], vec![]);
        let header = tag_node("@header", vec![], vec![]);
        let mut row = tag_node("@row", vec![], vec![]);
        row.body.params = vec!["item".to_string()];

        assert!(has_stateful_capture(&mut unit, &row, &[&root, &header], &mut files));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_analyze_program_flags_and_macros() {
        let mut files = FakeFiles::default().with_template("list", split_component());
        let fs = FakeFileSystem::new().with_dir("/app", &["page.marko", "page.component-browser.js"]);
        let mut unit = unit();

        let mut program = program(vec![
            class_block("class { onCreate() {} }").into(),
            tag_with_params("macro", &["{ name }"], vec![]).into(),
            tag_with_params("list", &["item"], vec![]).into(),
        ]);
        if let BodyItem::Template(crate::ir::TemplateNode::Tag(m)) = &mut program.body[1] {
            m.attributes.push(attr("name", "'greeting'"));
        }

        analyze_program(&mut unit, &program, &fs, &mut files);

        assert!(unit.meta().has_component);
        assert!(unit.meta().has_component_browser);
        assert!(unit.meta().macros.contains("greeting"));
        assert_eq!(unit.meta().has_stateful_capture, StatefulCapture::No);
    }
}
