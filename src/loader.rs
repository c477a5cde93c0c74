use std::{fs, io};

/// Supplies the raw text behind a `load` path. Path resolution is entirely
/// the loader's business.
pub trait SourceLoader {
    fn load(&self, path: &str) -> io::Result<String>;
}

/// Reads paths straight from the filesystem, relative to the working
/// directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }
}
