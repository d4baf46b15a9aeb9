pub mod config;
pub mod container;
pub mod format;
pub mod index;
pub mod locale;
pub mod manager;
pub mod package;
pub mod plural;
pub mod qualifier;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Configuration, DeviceClass, Direction, ScreenDensity};
pub use container::{Container, ContainerSource, LoadError};
pub use format::{FormatArg, FormatError, format_template};
pub use index::{IdItem, ItemValue, ResType, TableError};
pub use locale::{Locale, LocaleError, SystemLocale};
pub use manager::{Error, ResourceKey, ResourceManager, ResourceManagerBuilder, ValueHandle};
pub use package::{DirectoryPackage, PackageError, PackageReader};
pub use plural::{IcuPluralProvider, PluralCategory, PluralError, PluralRuleProvider, PluralRules};
pub use qualifier::{KeyKind, QualifierKey, config_from_keys, folder_from_keys, keys_from_folder};
