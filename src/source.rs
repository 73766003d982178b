use std::io::ErrorKind;

use camino::Utf8Path;

use crate::error::ReadError;

pub trait SourceReader: Send + Sync {
    fn read_file(&self, path: &Utf8Path) -> Result<String, ReadError>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_file(&self, path: &Utf8Path) -> Result<String, ReadError> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
            _ => ReadError::Io { path: path.to_path_buf(), source: e },
        })
    }
}
