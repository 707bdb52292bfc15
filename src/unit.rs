//! Per-file compilation state.
//!
//! A `CompilationUnit` is created once per template, owned by the single
//! translation of that file, mutated by the analysis and assembly steps,
//! and consumed by [`CompilationUnit::freeze`] when the output module is
//! produced, so no metadata write can follow it.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::options::OutputMode;
use crate::paths::resolve_relative_path;

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether some tag invocation in the file exposes component state to its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatefulCapture {
    #[default]
    Unknown,
    No,
    Yes,
}

impl StatefulCapture {
    pub fn is_yes(self) -> bool {
        self == StatefulCapture::Yes
    }
}

/// A dependency of the compiled template, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    Path(String),
    /// Package descriptor companion, serialized as `package: <path>`.
    Package(String),
    /// Non-path marker supplied by a collaborator, passed through untouched.
    Opaque(serde_json::Value),
}

impl Dependency {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Dependency::Path(path) => serde_json::Value::String(path.clone()),
            Dependency::Package(path) => serde_json::Value::String(format!("package: {}", path)),
            Dependency::Opaque(value) => value.clone(),
        }
    }

    /// Rewrite path dependencies relative to `from_file`. Markers are unchanged.
    pub fn relative_to(self, from_file: &Path) -> Self {
        match self {
            Dependency::Path(path) => Dependency::Path(resolve_relative_path(from_file, &path)),
            Dependency::Package(path) => {
                Dependency::Package(resolve_relative_path(from_file, &path))
            }
            opaque => opaque,
        }
    }
}

impl Serialize for Dependency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Sibling artifacts found next to a template, as `./name` requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFiles {
    pub style_file: Option<String>,
    pub package_file: Option<String>,
    pub component_file: Option<String>,
    pub component_browser_file: Option<String>,
}

/// What other files need to know about a template once it is analyzed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub has_stateful_capture: bool,
    pub has_component: bool,
    pub has_component_browser: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub deps: Vec<Dependency>,
    pub tags: Vec<String>,
    pub has_stateful_capture: StatefulCapture,
    pub has_component: bool,
    pub has_component_browser: bool,
    pub component: Option<String>,
    pub component_files: Option<ComponentFiles>,
    #[serde(skip)]
    pub macros: HashSet<String>,
}

impl FileMetadata {
    /// Append a tag module path unless it is already recorded.
    pub fn add_tag(&mut self, path: &str) -> bool {
        if self.tags.iter().any(|existing| existing == path) {
            return false;
        }
        self.tags.push(path.to_string());
        true
    }

    /// Dependencies are kept exactly as added, duplicates included.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.deps.push(dependency);
    }

    /// Memoize a capture result. A `Yes` is never downgraded.
    pub fn record_stateful_capture(&mut self, detected: bool) {
        if detected {
            self.has_stateful_capture = StatefulCapture::Yes;
        } else if self.has_stateful_capture == StatefulCapture::Unknown {
            self.has_stateful_capture = StatefulCapture::No;
        }
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            has_stateful_capture: self.has_stateful_capture.is_yes(),
            has_component: self.has_component,
            has_component_browser: self.has_component_browser,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION UNIT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct CompilationUnit {
    path: PathBuf,
    meta: FileMetadata,
    pub output: OutputMode,
    /// Whole-file executable code replacing the template body.
    pub module_code: Option<String>,
    used_names: HashSet<String>,
}

impl CompilationUnit {
    pub fn new(path: impl Into<PathBuf>, output: OutputMode) -> Self {
        let path = path.into();
        let meta = FileMetadata {
            id: generate_template_id(&path),
            ..Default::default()
        };
        Self {
            path,
            meta,
            output,
            module_code: None,
            used_names: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn meta(&self) -> &FileMetadata {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut FileMetadata {
        &mut self.meta
    }

    /// End the unit and hand back its final record.
    pub fn freeze(self) -> FileMetadata {
        self.meta
    }

    /// Mark an identifier as taken by authored code.
    pub fn reserve_name(&mut self, name: &str) {
        self.used_names.insert(name.to_string());
    }

    /// `_hint`, then `_hint2`, `_hint3`, ... whichever is free first.
    pub fn generate_uid(&mut self, hint: &str) -> String {
        let base = format!("_{}", to_identifier(hint));
        let mut candidate = base.clone();
        let mut counter = 2;
        while self.used_names.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        self.used_names.insert(candidate.clone());
        candidate
    }
}

/// `my-tag` -> `myTag`, `@header` -> `header`.
fn to_identifier(hint: &str) -> String {
    let mut out = String::with_capacity(hint.len());
    let mut upper_next = false;
    for c in hint.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if upper_next && !out.is_empty() {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Stable id derived from the source path: sanitized stem plus a short hash.
pub fn generate_template_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    format!("{}_{}", stem, &digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_usage_is_deduplicated_in_first_seen_order() {
        let mut meta = FileMetadata::default();
        assert!(meta.add_tag("./components/a.marko"));
        assert!(meta.add_tag("./components/b.marko"));
        assert!(!meta.add_tag("./components/a.marko"));
        assert_eq!(meta.tags, vec!["./components/a.marko", "./components/b.marko"]);
    }

    #[test]
    fn test_dependencies_keep_duplicates() {
        let mut meta = FileMetadata::default();
        meta.add_dependency(Dependency::Path("./a.css".to_string()));
        meta.add_dependency(Dependency::Path("./a.css".to_string()));
        assert_eq!(meta.deps.len(), 2);
    }

    #[test]
    fn test_capture_flag_never_downgrades() {
        let mut meta = FileMetadata::default();
        meta.record_stateful_capture(false);
        assert_eq!(meta.has_stateful_capture, StatefulCapture::No);
        meta.record_stateful_capture(true);
        meta.record_stateful_capture(false);
        assert_eq!(meta.has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_template_id_is_stable_per_path() {
        let a = generate_template_id(Path::new("/app/src/my-page.marko"));
        let b = generate_template_id(Path::new("/app/src/my-page.marko"));
        let c = generate_template_id(Path::new("/app/other/my-page.marko"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("my_page_"));
        assert_eq!(a.len(), "my_page_".len() + 8);
    }

    #[test]
    fn test_generate_uid_avoids_collisions() {
        let mut unit = CompilationUnit::new("/app/a.marko", OutputMode::html());
        unit.reserve_name("_marko_template");
        assert_eq!(unit.generate_uid("marko_template"), "_marko_template2");
        assert_eq!(unit.generate_uid("marko_template"), "_marko_template3");
        assert_eq!(unit.generate_uid("my-tag"), "_myTag");
    }

    #[test]
    fn test_freeze_returns_final_record() {
        let mut unit = CompilationUnit::new("/app/a.marko", OutputMode::html());
        unit.meta_mut().add_tag("./components/b.marko");
        unit.meta_mut().record_stateful_capture(true);
        let id = unit.meta().id.clone();

        let metadata = unit.freeze();
        assert_eq!(metadata.id, id);
        assert_eq!(metadata.tags, vec!["./components/b.marko"]);
        assert_eq!(metadata.has_stateful_capture, StatefulCapture::Yes);
    }

    #[test]
    fn test_dependency_serialization() {
        let deps = vec![
            Dependency::Path("./a.css".to_string()),
            Dependency::Package("./package.json".to_string()),
            Dependency::Opaque(serde_json::json!({ "type": "js", "virtualPath": "x.js" })),
        ];
        let value = serde_json::to_value(&deps).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                "./a.css",
                "package: ./package.json",
                { "type": "js", "virtualPath": "x.js" }
            ])
        );
    }
}
