//! Companion File Resolution Tests
//!
//! - Naming convention per template stem, `index` templates with optional prefix
//! - Memoization on the compilation unit
//! - Absence is never an error

#[cfg(test)]
mod tests {
    use crate::companion::resolve_component_files;
    use crate::fs::NativeFileSystem;
    use crate::options::OutputMode;
    use crate::test_support::FakeFileSystem;
    use crate::unit::{CompilationUnit, ComponentFiles};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn unit(path: &str) -> CompilationUnit {
        CompilationUnit::new(path, OutputMode::html())
    }

    #[test]
    fn test_all_four_companions_found() {
        let fs = FakeFileSystem::new().with_dir(
            "/app/src",
            &[
                "page.marko",
                "page.style.less",
                "page.package.json",
                "page.component.js",
                "page.component-browser.js",
                "other.style.css",
            ],
        );
        let mut unit = unit("/app/src/page.marko");

        let files = resolve_component_files(&mut unit, &fs);

        assert_eq!(
            files,
            ComponentFiles {
                style_file: Some("./page.style.less".to_string()),
                package_file: Some("./page.package.json".to_string()),
                component_file: Some("./page.component.js".to_string()),
                component_browser_file: Some("./page.component-browser.js".to_string()),
            }
        );
    }

    #[test]
    fn test_resolution_is_memoized() {
        let fs = FakeFileSystem::new().with_dir("/app/src", &["page.marko", "page.component.ts"]);
        let mut unit = unit("/app/src/page.marko");

        let first = resolve_component_files(&mut unit, &fs);
        let second = resolve_component_files(&mut unit, &fs);

        assert_eq!(first, second);
        assert_eq!(fs.reads(), 1);
    }

    #[test]
    fn test_index_template_accepts_bare_names() {
        let fs = FakeFileSystem::new().with_dir(
            "/app/components/card",
            &["index.marko", "component.js", "style.css", "index.style.scss"],
        );
        let mut unit = unit("/app/components/card/index.marko");

        let files = resolve_component_files(&mut unit, &fs);

        assert_eq!(files.component_file.as_deref(), Some("./component.js"));
        // Sorted order decides between the two stylesheets.
        assert_eq!(files.style_file.as_deref(), Some("./index.style.scss"));
    }

    #[test]
    fn test_non_index_template_requires_prefix() {
        let fs = FakeFileSystem::new().with_dir("/app/src", &["page.marko", "component.js", "style.css"]);
        let mut unit = unit("/app/src/page.marko");

        assert_eq!(resolve_component_files(&mut unit, &fs), ComponentFiles::default());
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let fs = FakeFileSystem::new();
        let mut unit = unit("/nowhere/page.marko");

        assert_eq!(resolve_component_files(&mut unit, &fs), ComponentFiles::default());
        assert!(unit.meta().component_files.is_some());
    }

    #[test]
    fn test_real_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("widget.marko"), "").unwrap();
        fs::write(dir.path().join("widget.component-browser.js"), "").unwrap();
        fs::write(dir.path().join("widget.style.css"), "").unwrap();

        let mut unit = CompilationUnit::new(dir.path().join("widget.marko"), OutputMode::dom());
        let files = resolve_component_files(&mut unit, &NativeFileSystem);

        assert_eq!(files.component_file, None);
        assert_eq!(
            files.component_browser_file.as_deref(),
            Some("./widget.component-browser.js")
        );
        assert_eq!(files.style_file.as_deref(), Some("./widget.style.css"));
    }
}
