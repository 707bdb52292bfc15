//! Companion file resolution.
//!
//! A template `dir/name.ext` may have siblings supplying its component class
//! (`name.component.js`), a browser-only override (`name.component-browser.js`),
//! a stylesheet (`name.style.css`) and a package descriptor
//! (`name.package.json`). For `index` templates the `name.` prefix is optional.
//! The lookup runs once per unit and is cached on its metadata.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::path::Path;

use crate::fs::FileSystem;
use crate::unit::{CompilationUnit, ComponentFiles};

lazy_static! {
    static ref COMPANION: Regex = Regex::new(
        r"^(?:(?P<stem>.+)\.)?(?P<kind>style\.\w+|package\.json|component-browser\.\w+|component\.\w+)$"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompanionKind {
    Style,
    Package,
    Component,
    ComponentBrowser,
}

/// The companion kind `entry` provides for a template named `stem`.
fn companion_kind(entry: &str, stem: &str) -> Option<CompanionKind> {
    let caps = COMPANION.captures(entry)?;
    match caps.name("stem").map(|m| m.as_str()) {
        Some(prefix) if prefix == stem => {}
        None if stem == "index" => {}
        _ => return None,
    }

    let kind = caps.name("kind")?.as_str();
    if kind == "package.json" {
        Some(CompanionKind::Package)
    } else if kind.starts_with("style.") {
        Some(CompanionKind::Style)
    } else if kind.starts_with("component-browser.") {
        Some(CompanionKind::ComponentBrowser)
    } else {
        Some(CompanionKind::Component)
    }
}

/// Resolve the companions of `unit`, listing storage only on the first call.
pub fn resolve_component_files(unit: &mut CompilationUnit, fs: &dyn FileSystem) -> ComponentFiles {
    if let Some(files) = &unit.meta().component_files {
        return files.clone();
    }

    let files = scan_component_files(unit.path(), fs);
    debug!(
        "[Translator] Companions for {}: {:?}",
        unit.file_name(),
        files
    );
    unit.meta_mut().component_files = Some(files.clone());
    files
}

fn scan_component_files(template: &Path, fs: &dyn FileSystem) -> ComponentFiles {
    let mut files = ComponentFiles::default();

    let stem = match template.file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => return files,
    };
    let dir = template.parent().unwrap_or_else(|| Path::new("."));
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    let mut entries = match fs.read_dir_names(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("[Translator] Could not list {:?}: {}", dir, e);
            return files;
        }
    };
    entries.sort();

    for entry in entries {
        let slot = match companion_kind(&entry, &stem) {
            Some(CompanionKind::Style) => &mut files.style_file,
            Some(CompanionKind::Package) => &mut files.package_file,
            Some(CompanionKind::Component) => &mut files.component_file,
            Some(CompanionKind::ComponentBrowser) => &mut files.component_browser_file,
            None => {
                trace!("[Translator] Ignoring sibling {}", entry);
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(format!("./{}", entry));
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_kinds() {
        assert_eq!(companion_kind("page.style.less", "page"), Some(CompanionKind::Style));
        assert_eq!(
            companion_kind("page.component-browser.ts", "page"),
            Some(CompanionKind::ComponentBrowser)
        );
        assert_eq!(companion_kind("page.component.js", "page"), Some(CompanionKind::Component));
        assert_eq!(
            companion_kind("my.page.package.json", "my.page"),
            Some(CompanionKind::Package)
        );
        assert_eq!(companion_kind("other.style.css", "page"), None);
        assert_eq!(companion_kind("style.css", "page"), None);
        assert_eq!(companion_kind("style.css", "index"), Some(CompanionKind::Style));
        assert_eq!(companion_kind("page.marko", "page"), None);
    }
}
