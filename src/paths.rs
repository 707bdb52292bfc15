//! Path helpers for emitting module requests relative to the compiling file.

use lazy_static::lazy_static;
use regex::Regex;
use std::env;
use std::path::{Component, Path};

lazy_static! {
    static ref NODE_MODULES_PREFIX: Regex = Regex::new(r"^(?:\.{1,2}/)+node_modules/").unwrap();
}

/// Turn `request` into an import specifier usable from `from_file`.
///
/// Requests already starting with `./` or `../` are kept. Anything else is a
/// path, absolute or relative to the working directory like `from_file`, and
/// is rewritten relative to the directory of `from_file`. A leading
/// `node_modules/` hop is dropped so package requests stay bare.
pub fn resolve_relative_path(from_file: &Path, request: &str) -> String {
    if request.starts_with("./") || request.starts_with("../") {
        return request.to_string();
    }

    let base = from_file.parent().unwrap_or_else(|| Path::new(""));
    let mut relative = relative_between(base, Path::new(request))
        .unwrap_or_else(|| request.to_string())
        .replace('\\', "/");
    if !relative.starts_with("./") && !relative.starts_with("../") {
        relative = format!("./{}", relative);
    }

    NODE_MODULES_PREFIX.replace(&relative, "").into_owned()
}

/// Relative path from directory `base` to `target`.
///
/// When only one side is absolute the other is anchored at the working
/// directory first.
fn relative_between(base: &Path, target: &Path) -> Option<String> {
    let (base, target) = if base.is_absolute() == target.is_absolute() {
        (base.to_path_buf(), target.to_path_buf())
    } else {
        let cwd = env::current_dir().ok()?;
        (cwd.join(base), cwd.join(target))
    };

    let base_parts: Vec<Component> = significant_components(&base);
    let target_parts: Vec<Component> = significant_components(&target);
    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        segments.push("..".to_string());
    }
    for part in &target_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().to_string());
    }

    Some(segments.join("/"))
}

fn significant_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
