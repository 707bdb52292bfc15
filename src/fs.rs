use std::fs;
use std::io;
use std::path::Path;

/// Storage lookups used while compiling. Lookups are synchronous and side-effect free.
pub trait FileSystem {
    /// File names (not paths) of the entries directly inside `dir`.
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>>;
}

/// Reads the real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}
