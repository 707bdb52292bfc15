//! Tag import rewriting.

use log::debug;

use crate::ir::ImportDeclaration;
use crate::registry::{resolve_tag_import, TagRegistry};
use crate::unit::CompilationUnit;

/// Point an import of `<tag-name>` at the module implementing the tag and
/// record it in the unit's tag usage. Other imports are left alone.
pub fn rewrite_tag_import(
    unit: &mut CompilationUnit,
    import: &mut ImportDeclaration,
    registry: &dyn TagRegistry,
) -> bool {
    let Some(entry) = resolve_tag_import(registry, unit.path(), &import.source) else {
        return false;
    };

    debug!(
        "[Translator] Import {} -> {} in {}",
        import.source,
        entry,
        unit.file_name()
    );
    unit.meta_mut().add_tag(&entry);
    import.source = entry;
    true
}
