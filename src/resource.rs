//! Loading SQL schema scripts.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Reads a whole script as raw bytes. The reader is consumed and dropped
/// before returning.
pub fn read_script_bytes<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    Ok(content)
}

/// Reads a whole script as UTF-8 text.
pub fn read_script<R: Read>(mut reader: R) -> Result<String> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(content)
}

pub fn load_script(path: &Path) -> Result<String> {
    read_script(File::open(path)?)
}
