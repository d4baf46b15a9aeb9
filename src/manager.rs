//! Multi-container resource manager.
//!
//! Every public operation takes the single state lock for its duration;
//! the resolver composes these operations and never holds the lock itself.

use std::{
    collections::{HashSet, VecDeque},
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info, warn};
use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    config::Configuration,
    container::{Container, ContainerSource, LoadError, QualifiedValue},
    format::FormatError,
    index::{IdItem, ResType},
    locale::SystemLocale,
    package::PackageReader,
    plural::{IcuPluralProvider, PluralCategory, PluralError, PluralRuleProvider, PluralRules},
};

pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 20;
pub const DEFAULT_PLURAL_CACHE_CAPACITY: usize = 3;

#[derive(Debug, Error)]
pub enum Error {
    #[error("resource {0} not found")]
    NotFound(String),

    #[error("resource {key} is a {actual:?}, not a {expected:?}")]
    TypeMismatch {
        key: String,
        expected: ResType,
        actual: ResType,
    },

    #[error("reference chain starting at `{0}` is too deep")]
    ReferenceTooDeep(String),

    #[error("reference `{0}` points to a missing resource")]
    DanglingReference(String),

    #[error("reference `{reference}` resolves to a {actual:?}")]
    ReferenceTypeMismatch { reference: String, actual: ResType },

    #[error("reference `{0}` targets an array resource")]
    ArrayReference(String),

    #[error("`{value}` is not a valid {expected} value")]
    InvalidValue { expected: &'static str, value: String },

    #[error("parent `{0}` cannot be resolved")]
    MissingParent(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("container `{0}` is already loaded")]
    DuplicateContainer(PathBuf),

    #[error("cannot load container `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("configuration carries no locale")]
    LocaleInfoIsNull,

    #[error("reloading `{path}` under the new configuration failed: {source}")]
    ReloadFailed {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

impl Error {
    /// Lookup misses (absent resource or wrong declared type).
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::TypeMismatch { .. })
    }
}

/// How a resource is addressed by a getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKey<'a> {
    Id(u32),
    Name(&'a str),
}

impl fmt::Display for ResourceKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{id:#x}"),
            ResourceKey::Name(name) => write!(f, "`{name}`"),
        }
    }
}

/// A selected qualified value; keeps its container generation alive.
#[derive(Debug, Clone)]
pub struct ValueHandle {
    container: Arc<Container>,
    index: usize,
}

impl ValueHandle {
    #[inline]
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    #[inline]
    pub fn value(&self) -> QualifiedValue<'_> {
        self.container.value_at(self.index)
    }

    #[inline]
    pub fn item(&self) -> &IdItem {
        self.value().item
    }

    #[inline]
    pub fn folder(&self) -> &str {
        &self.value().group.folder
    }
}

#[derive(Default)]
struct State {
    config: Configuration,
    containers: Vec<Arc<Container>>,
    loaded: HashSet<PathBuf>,
    plural_cache: VecDeque<(String, Arc<dyn PluralRules>)>,
}

pub struct ResourceManager {
    state: Mutex<State>,
    pub(crate) max_reference_depth: usize,
    plural_cache_capacity: usize,
    plural_provider: Arc<dyn PluralRuleProvider>,
    system_locale: SystemLocale,
}

impl State {
    fn cached_languages(&self) -> Vec<String> {
        self.plural_cache
            .iter()
            .map(|(language, _)| language.clone())
            .collect()
    }

    fn select(&self, container: &Arc<Container>, id: u32) -> Option<ValueHandle> {
        let index = container.select_best(id, &self.config)?;
        Some(ValueHandle {
            container: Arc::clone(container),
            index,
        })
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourceManager")
            .field("config", &state.config)
            .field("containers", &state.containers.len())
            .field("plural_cache", &state.cached_languages())
            .field("max_reference_depth", &self.max_reference_depth)
            .field("plural_provider", &self.plural_provider)
            .finish()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ResourceManager {
    pub fn builder() -> ResourceManagerBuilder {
        ResourceManagerBuilder::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Containers
    // ─────────────────────────────────────────────────────────────────────────

    /// Load an index file and append it. Adding a path twice fails.
    pub fn add_container(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.add_source(ContainerSource::File(path.as_ref().to_path_buf()), false)
    }

    /// Like [`add_container`](Self::add_container), flagged as a system container.
    pub fn add_system_container(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.add_source(ContainerSource::File(path.as_ref().to_path_buf()), true)
    }

    /// Load `assets/<module>/resources.index` out of a package.
    pub fn add_package(
        &self,
        reader: Arc<dyn PackageReader>,
        package: impl AsRef<Path>,
    ) -> Result<(), Error> {
        let package = package.as_ref().to_path_buf();
        self.add_source(ContainerSource::Package { reader, package }, false)
    }

    fn add_source(&self, source: ContainerSource, is_system: bool) -> Result<(), Error> {
        let mut state = self.state.lock();
        let key = source.key().to_path_buf();
        if state.loaded.contains(&key) {
            warn!("container `{}` is already loaded", key.display());
            return Err(Error::DuplicateContainer(key));
        }

        let container = Container::load_from(source, &state.config, is_system).map_err(|source| {
            Error::Load {
                path: key.clone(),
                source,
            }
        })?;
        state.containers.push(Arc::new(container));
        state.loaded.insert(key);
        Ok(())
    }

    /// Number of loaded containers.
    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of the active configuration.
    pub fn config(&self) -> Configuration {
        self.state.lock().config.clone()
    }

    /// Install `config` and reload every container under it.
    ///
    /// Reload is all-or-nothing: on the first failure the new generation is
    /// dropped and both the previous containers and the previous
    /// configuration stay in service.
    pub fn update_config(&self, config: &Configuration) -> Result<(), Error> {
        if config.locale().is_none() {
            return Err(Error::LocaleInfoIsNull);
        }

        let mut requested = config.clone();
        requested.complete_script();

        let mut state = self.state.lock();
        let previous = state.config.clone();
        if !state.config.copy_from(&requested) {
            debug!("configuration unchanged, skipping reload");
            return Ok(());
        }
        state.config.complete_script();

        let generation: Result<Vec<_>, _> = state
            .containers
            .iter()
            .map(|container| {
                container
                    .reload(&state.config)
                    .map(Arc::new)
                    .map_err(|source| (container.source().key().to_path_buf(), source))
            })
            .collect();

        match generation {
            Ok(generation) => {
                info!(
                    "reloaded {} containers for locale {}",
                    generation.len(),
                    state
                        .config
                        .locale()
                        .map(ToString::to_string)
                        .unwrap_or_default()
                );
                state.containers = generation;
                Ok(())
            }
            Err((path, source)) => {
                warn!(
                    "reload of `{}` failed, keeping previous generation: {source}",
                    path.display()
                );
                state.config = previous;
                Err(Error::ReloadFailed { path, source })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// First container, in load order, that defines `id`.
    pub fn find_by_id(&self, id: u32) -> Option<Arc<Container>> {
        let state = self.state.lock();
        state.containers.iter().find(|c| c.contains_id(id)).cloned()
    }

    /// First container, in load order, that defines `name` within `res_type`,
    /// with the id the name maps to.
    pub fn find_by_name(&self, res_type: ResType, name: &str) -> Option<(Arc<Container>, u32)> {
        let state = self.state.lock();
        state
            .containers
            .iter()
            .find_map(|c| c.id_for_name(res_type, name).map(|id| (Arc::clone(c), id)))
    }

    /// Every qualified value registered under `name`, as `(folder, item)`.
    pub fn qualified_values_by_name(&self, res_type: ResType, name: &str) -> Vec<(String, IdItem)> {
        let Some((container, id)) = self.find_by_name(res_type, name) else {
            return Vec::new();
        };
        container
            .values(id)
            .map(|v| (v.group.folder.clone(), v.item.clone()))
            .collect()
    }

    /// Best qualified value for `id` under the active configuration.
    pub fn select_by_id(&self, id: u32) -> Result<ValueHandle, Error> {
        let state = self.state.lock();
        state
            .containers
            .iter()
            .find(|c| c.contains_id(id))
            .and_then(|container| state.select(container, id))
            .ok_or_else(|| Error::NotFound(ResourceKey::Id(id).to_string()))
    }

    /// Best qualified value for `name` within `res_type`.
    pub fn select_by_name(&self, res_type: ResType, name: &str) -> Result<ValueHandle, Error> {
        let state = self.state.lock();
        state
            .containers
            .iter()
            .find_map(|c| c.id_for_name(res_type, name).map(|id| (c, id)))
            .and_then(|(container, id)| state.select(container, id))
            .ok_or_else(|| Error::NotFound(format!("{} `{name}`", res_type.type_name())))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plurals
    // ─────────────────────────────────────────────────────────────────────────

    /// Plural category of `quantity` for the active language.
    ///
    /// Falls back to the system locale when the configuration has none, and
    /// to [`PluralCategory::Other`] when neither is set or rules are unavailable.
    pub fn plural_category(&self, quantity: i64) -> PluralCategory {
        let mut state = self.state.lock();
        let language = state
            .config
            .locale()
            .map(|l| l.language().to_owned())
            .or_else(|| self.system_locale.get().map(|l| l.language().to_owned()));
        let Some(language) = language else {
            return PluralCategory::Other;
        };
        match self.cached_rules(&mut state, &language) {
            Ok(rules) => rules.category_for(quantity),
            Err(err) => {
                debug!("no plural rules, using `other`: {err}");
                PluralCategory::Other
            }
        }
    }

    /// Cached rules for `language`; the cache evicts the oldest insertion.
    pub fn plural_rules(&self, language: &str) -> Result<Arc<dyn PluralRules>, PluralError> {
        let mut state = self.state.lock();
        self.cached_rules(&mut state, language)
    }

    fn cached_rules(
        &self,
        state: &mut State,
        language: &str,
    ) -> Result<Arc<dyn PluralRules>, PluralError> {
        if let Some((_, rules)) = state.plural_cache.iter().find(|(l, _)| l == language) {
            return Ok(Arc::clone(rules));
        }

        let rules = self.plural_provider.rules_for(language)?;
        if self.plural_cache_capacity == 0 {
            return Ok(rules);
        }
        while state.plural_cache.len() >= self.plural_cache_capacity {
            if let Some((evicted, _)) = state.plural_cache.pop_front() {
                debug!("evicting plural rules for `{evicted}`");
            }
        }
        state
            .plural_cache
            .push_back((language.to_owned(), Arc::clone(&rules)));
        Ok(rules)
    }

    /// Languages currently cached, oldest first.
    pub fn cached_plural_languages(&self) -> Vec<String> {
        self.state.lock().cached_languages()
    }

    #[inline]
    pub fn system_locale(&self) -> &SystemLocale {
        &self.system_locale
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

pub struct ResourceManagerBuilder {
    config: Configuration,
    max_reference_depth: usize,
    plural_cache_capacity: usize,
    plural_provider: Arc<dyn PluralRuleProvider>,
    system_locale: SystemLocale,
}

impl Default for ResourceManagerBuilder {
    fn default() -> Self {
        Self {
            config: Configuration::default(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            plural_cache_capacity: DEFAULT_PLURAL_CACHE_CAPACITY,
            plural_provider: Arc::new(IcuPluralProvider),
            system_locale: SystemLocale::default(),
        }
    }
}

impl ResourceManagerBuilder {
    /// Initial active configuration (default: everything unset).
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    pub fn max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn plural_cache_capacity(mut self, capacity: usize) -> Self {
        self.plural_cache_capacity = capacity;
        self
    }

    pub fn plural_provider(mut self, provider: Arc<dyn PluralRuleProvider>) -> Self {
        self.plural_provider = provider;
        self
    }

    pub fn system_locale(mut self, system_locale: SystemLocale) -> Self {
        self.system_locale = system_locale;
        self
    }

    pub fn build(self) -> ResourceManager {
        let mut config = self.config;
        config.complete_script();
        ResourceManager {
            state: Mutex::new(State {
                config,
                ..State::default()
            }),
            max_reference_depth: self.max_reference_depth,
            plural_cache_capacity: self.plural_cache_capacity,
            plural_provider: self.plural_provider,
            system_locale: self.system_locale,
        }
    }
}
