//! Tag registry.
//!
//! Maps custom tag names to the files that define them. The registry is a
//! collaborator: the translator only asks it questions and never fails when
//! a lookup comes back empty.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::paths::resolve_relative_path;

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE ELEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref HTML_TAGS: HashSet<&'static str> = [
        "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
        "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
        "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl",
        "dt", "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
        "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img",
        "input", "ins", "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu",
        "meta", "meter", "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p",
        "param", "picture", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script",
        "search", "section", "select", "slot", "small", "source", "span", "strong", "style",
        "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea", "tfoot", "th",
        "thead", "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
    ]
    .into_iter()
    .collect();

    static ref SVG_TAGS: HashSet<&'static str> = [
        "svg", "path", "circle", "ellipse", "line", "polyline", "polygon", "rect", "g", "defs",
        "use", "symbol", "clipPath", "mask", "pattern", "marker", "linearGradient",
        "radialGradient", "stop", "filter", "foreignObject", "image", "switch", "text", "tspan",
        "textPath",
    ]
    .into_iter()
    .collect();

    /// Elements that never have a closing tag.
    pub static ref VOID_TAGS: HashSet<&'static str> = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect();

    static ref TAG_IMPORT: Regex = Regex::new(r"^<([^<>\s]+)>$").unwrap();
}

pub fn is_known_element(name: &str) -> bool {
    HTML_TAGS.contains(name) || SVG_TAGS.contains(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    pub name: String,
    /// Template implementing the tag.
    pub template: Option<PathBuf>,
    /// Plain module implementing the tag when there is no template.
    pub renderer: Option<PathBuf>,
    /// Declared as a native element.
    pub html: bool,
}

impl TagDefinition {
    pub fn template(name: &str, template: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            template: Some(template.into()),
            renderer: None,
            html: false,
        }
    }

    pub fn renderer(name: &str, renderer: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            template: None,
            renderer: Some(renderer.into()),
            html: false,
        }
    }

    pub fn html(name: &str) -> Self {
        Self {
            name: name.to_string(),
            template: None,
            renderer: None,
            html: true,
        }
    }

    /// The module to import for this tag: the template, else the renderer.
    pub fn entry(&self) -> Option<&Path> {
        self.template.as_deref().or(self.renderer.as_deref())
    }
}

pub trait TagRegistry {
    /// Look up `name` as seen from the template at `from`.
    fn lookup(&self, from: &Path, name: &str) -> Option<TagDefinition>;

    /// Built-in elements are rendered directly and never load another file.
    fn is_native(&self, from: &Path, name: &str) -> bool {
        match self.lookup(from, name) {
            Some(def) => def.html,
            None => is_known_element(name),
        }
    }
}

/// Resolve an import source naming a custom tag (`<my-tag>`) to a module request
/// relative to `from`. Returns `None` for ordinary imports and unknown tags.
pub fn resolve_tag_import(registry: &dyn TagRegistry, from: &Path, source: &str) -> Option<String> {
    let caps = TAG_IMPORT.captures(source)?;
    let name = caps.get(1)?.as_str();
    let def = registry.lookup(from, name)?;
    let entry = def.entry()?;
    Some(resolve_relative_path(from, &entry.to_string_lossy()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry backed by an explicit name -> definition map.
#[derive(Debug, Default, Clone)]
pub struct StaticTagRegistry {
    tags: HashMap<String, TagDefinition>,
}

impl StaticTagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, def: TagDefinition) -> Self {
        self.insert(def);
        self
    }

    pub fn insert(&mut self, def: TagDefinition) {
        self.tags.insert(def.name.clone(), def);
    }
}

impl TagRegistry for StaticTagRegistry {
    fn lookup(&self, _from: &Path, name: &str) -> Option<TagDefinition> {
        self.tags.get(name).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTORY REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Discovers tags from `components/` directories next to the template and in
/// every ancestor directory, nearest first.
///
/// `components/card.marko` and `components/card/index.marko` both define `card`.
#[derive(Debug, Default)]
pub struct DirectoryTagRegistry {
    discovered: RefCell<HashMap<PathBuf, HashMap<String, TagDefinition>>>,
}

impl DirectoryTagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn tags_in(&self, components_dir: &Path) -> HashMap<String, TagDefinition> {
        if let Some(found) = self.discovered.borrow().get(components_dir) {
            return found.clone();
        }

        let found = discover_components(components_dir);
        self.discovered
            .borrow_mut()
            .insert(components_dir.to_path_buf(), found.clone());
        found
    }
}

impl TagRegistry for DirectoryTagRegistry {
    fn lookup(&self, from: &Path, name: &str) -> Option<TagDefinition> {
        let mut dir = from.parent();
        while let Some(current) = dir {
            let components_dir = current.join("components");
            if let Some(def) = self.tags_in(&components_dir).remove(name) {
                trace!("[Translator] <{}> resolved to {:?}", name, def.template);
                return Some(def);
            }
            dir = current.parent();
        }
        None
    }
}

fn discover_components(components_dir: &Path) -> HashMap<String, TagDefinition> {
    let mut tags = HashMap::new();
    if !components_dir.is_dir() {
        return tags;
    }

    for entry in WalkDir::new(components_dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .flatten()
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "marko") {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = if entry.depth() == 1 {
            stem
        } else if stem == "index" {
            match path.parent().and_then(|p| p.file_name()) {
                Some(dir_name) => dir_name.to_string_lossy().to_string(),
                None => continue,
            }
        } else {
            continue;
        };

        tags.entry(name.clone())
            .or_insert_with(|| TagDefinition::template(&name, path));
    }

    debug!(
        "[Translator] Discovered {} tag(s) in {:?}",
        tags.len(),
        components_dir
    );
    tags
}
