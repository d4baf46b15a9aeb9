//! Package transport: reading named entries out of an application package.
//!
//! The engine only needs two entries: `config.json` (for the module name) and
//! `assets/<module>/resources.index`.

use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};

use memchr::memmem;
use thiserror::Error;

pub const CONFIG_ENTRY: &str = "config.json";
pub const INDEX_FILE_NAME: &str = "resources.index";

const MODULE_NAME_KEY: &[u8] = b"\"moduleName\"";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("cannot read entry `{entry}` from `{package}`: {source}")]
    Read {
        package: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("`moduleName` missing from config.json in `{0}`")]
    MissingModuleName(PathBuf),
}

/// Reads named entries out of a package.
pub trait PackageReader: Debug + Send + Sync {
    fn read_entry(&self, package: &Path, entry: &str) -> Result<Vec<u8>, PackageError>;
}

/// A package already extracted to a directory; entries are relative paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryPackage;

impl PackageReader for DirectoryPackage {
    fn read_entry(&self, package: &Path, entry: &str) -> Result<Vec<u8>, PackageError> {
        fs::read(package.join(entry)).map_err(|source| PackageError::Read {
            package: package.to_path_buf(),
            entry: entry.to_owned(),
            source,
        })
    }
}

/// Entry name of the resource index for `module`.
#[inline]
pub fn index_entry(module: &str) -> String {
    format!("assets/{module}/{INDEX_FILE_NAME}")
}

/// Pull the `"moduleName"` string value out of a `config.json` body.
///
/// This is a text scan, not a JSON parse: the first occurrence of the key
/// wins and escape sequences are not interpreted.
pub fn module_name(config: &[u8]) -> Option<&str> {
    let at = memmem::find(config, MODULE_NAME_KEY)?;
    let rest = skip_ws(&config[at + MODULE_NAME_KEY.len()..]);
    let rest = skip_ws(rest.strip_prefix(b":")?);
    let rest = rest.strip_prefix(b"\"")?;
    let end = memchr::memchr(b'"', rest)?;
    let name = std::str::from_utf8(&rest[..end]).ok()?;
    (!name.is_empty()).then_some(name)
}

/// Read the module's resource index out of `package`.
///
/// Returns the index bytes and the entry path they were read from.
pub fn read_index(
    reader: &dyn PackageReader,
    package: &Path,
) -> Result<(Vec<u8>, String), PackageError> {
    let config = reader.read_entry(package, CONFIG_ENTRY)?;
    let module = module_name(&config)
        .ok_or_else(|| PackageError::MissingModuleName(package.to_path_buf()))?;
    let entry = index_entry(module);
    let bytes = reader.read_entry(package, &entry)?;
    Ok((bytes, entry))
}

#[inline]
fn skip_ws(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
