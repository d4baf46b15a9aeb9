//! One loaded resource container: the parsed index flattened into an arena
//! plus id and `(type, name)` lookup tables.
//!
//! A container is immutable once built. Configuration changes produce a new
//! container via [`Container::reload`]; the old one is dropped as a unit.

use std::{
    cmp::Ordering,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    config::Configuration,
    index::{self, IdItem, ResType, ResourceTable, TableError},
    package::{self, PackageError, PackageReader},
    qualifier::{QualifierPath, config_from_keys, folder_from_keys},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{0}` is empty")]
    Empty(PathBuf),

    #[error("malformed index: {0}")]
    Table(#[from] TableError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Where a container's index bytes come from; kept for reloads.
#[derive(Debug, Clone)]
pub enum ContainerSource {
    File(PathBuf),
    Package {
        reader: Arc<dyn PackageReader>,
        package: PathBuf,
    },
}

impl ContainerSource {
    /// Path used to detect duplicate adds.
    pub fn key(&self) -> &Path {
        match self {
            ContainerSource::File(path) => path,
            ContainerSource::Package { package, .. } => package,
        }
    }

    /// Read the index bytes; returns the index path alongside them.
    fn read(&self) -> Result<(PathBuf, Vec<u8>), LoadError> {
        let (path, bytes) = match self {
            ContainerSource::File(path) => {
                let bytes = fs::read(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                (path.clone(), bytes)
            }
            ContainerSource::Package { reader, package } => {
                let (bytes, entry) = package::read_index(reader.as_ref(), package)?;
                (package.join(entry), bytes)
            }
        };
        if bytes.is_empty() {
            return Err(LoadError::Empty(path));
        }
        Ok((path, bytes))
    }
}

/// A qualifier path shared by every item of one key block.
#[derive(Debug, Clone)]
pub struct QualifierGroup {
    pub keys: QualifierPath,
    pub config: Configuration,
    pub folder: String,
}

#[derive(Debug)]
struct Entry {
    group: usize,
    item: IdItem,
}

/// Borrowed view of one qualified value.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedValue<'a> {
    pub index: usize,
    pub group: &'a QualifierGroup,
    pub item: &'a IdItem,
}

#[derive(Debug)]
pub struct Container {
    source: ContainerSource,
    index_path: PathBuf,
    resource_root: PathBuf,
    is_system: bool,
    version: String,
    groups: Vec<QualifierGroup>,
    entries: Vec<Entry>,
    by_id: HashMap<u32, SmallVec<[usize; 4]>>,
    by_name: HashMap<(ResType, String), u32>,
}

impl Container {
    /// Load the index file at `path`, keeping only key blocks that match `default`.
    pub fn load(
        path: impl Into<PathBuf>,
        default: &Configuration,
        is_system: bool,
    ) -> Result<Self, LoadError> {
        Self::load_from(ContainerSource::File(path.into()), default, is_system)
    }

    pub fn load_from(
        source: ContainerSource,
        default: &Configuration,
        is_system: bool,
    ) -> Result<Self, LoadError> {
        let (index_path, bytes) = source.read()?;
        let table = index::parse(&bytes, Some(default))?;
        let container = Self::from_table(source, index_path, table, is_system);
        info!(
            "loaded {} container `{}`: {} ids in {} qualifier groups",
            if is_system { "system" } else { "app" },
            container.index_path.display(),
            container.by_id.len(),
            container.groups.len()
        );
        Ok(container)
    }

    /// Re-read from the same source under a new default configuration.
    pub fn reload(&self, default: &Configuration) -> Result<Self, LoadError> {
        Self::load_from(self.source.clone(), default, self.is_system)
    }

    fn from_table(
        source: ContainerSource,
        index_path: PathBuf,
        table: ResourceTable,
        is_system: bool,
    ) -> Self {
        let resource_root = index_path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut groups = Vec::with_capacity(table.keys.len());
        let mut entries = Vec::new();
        let mut by_id: HashMap<u32, SmallVec<[usize; 4]>> = HashMap::new();
        let mut by_name = HashMap::new();

        for block in table.keys {
            let group = groups.len();
            groups.push(QualifierGroup {
                config: config_from_keys(&block.qualifiers),
                folder: folder_from_keys(&block.qualifiers),
                keys: block.qualifiers,
            });
            for item in block.items {
                by_id.entry(item.id).or_default().push(entries.len());
                by_name
                    .entry((item.res_type, item.name.clone()))
                    .or_insert(item.id);
                entries.push(Entry { group, item });
            }
        }

        Self {
            source,
            index_path,
            resource_root,
            is_system,
            version: table.version,
            groups,
            entries,
            by_id,
            by_name,
        }
    }

    #[inline]
    pub fn source(&self) -> &ContainerSource {
        &self.source
    }

    #[inline]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Parent of the index file's directory; media and profile values are
    /// relative to it.
    #[inline]
    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn contains_id(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Id registered for `name` within `res_type` (first occurrence wins).
    #[inline]
    pub fn id_for_name(&self, res_type: ResType, name: &str) -> Option<u32> {
        self.by_name.get(&(res_type, name.to_owned())).copied()
    }

    /// Every qualified value of `id`, in key-block order.
    pub fn values(&self, id: u32) -> impl Iterator<Item = QualifiedValue<'_>> {
        self.by_id
            .get(&id)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&index| self.value(index))
    }

    pub fn value(&self, index: usize) -> Option<QualifiedValue<'_>> {
        let entry = self.entries.get(index)?;
        Some(QualifiedValue {
            index,
            group: self.groups.get(entry.group)?,
            item: &entry.item,
        })
    }

    /// Index must come from this container (`values` or `select_best`).
    pub(crate) fn value_at(&self, index: usize) -> QualifiedValue<'_> {
        let entry = &self.entries[index];
        QualifiedValue {
            index,
            group: &self.groups[entry.group],
            item: &entry.item,
        }
    }

    /// Best qualified value of `id` for `request`, or `None` when no value matches.
    pub fn select_best(&self, id: u32, request: &Configuration) -> Option<usize> {
        let mut best: Option<QualifiedValue<'_>> = None;
        for candidate in self.values(id) {
            if !candidate.group.config.matches(request) {
                continue;
            }
            best = match best {
                Some(current)
                    if candidate
                        .group
                        .config
                        .is_more_suitable(&current.group.config, request)
                        != Ordering::Greater =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        if best.is_none() {
            debug!(
                "no value of id {id:#x} matches the active configuration in `{}`",
                self.index_path.display()
            );
        }
        best.map(|value| value.index)
    }
}
