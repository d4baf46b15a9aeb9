use std::sync::Arc;

use parking_lot::RwLock;

use crate::locale::{Locale, LocaleError};

/// Shared, swappable "system" locale used as a fallback when the active
/// configuration carries no locale (plural rule selection).
///
/// Cloning shares the same slot; replace it with [`SystemLocale::set`].
#[derive(Debug, Clone, Default)]
pub struct SystemLocale {
    inner: Arc<RwLock<Option<Locale>>>,
}

impl SystemLocale {
    pub fn new(locale: Option<Locale>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(locale)),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<Locale> {
        self.inner.read().clone()
    }

    pub fn set(&self, locale: Option<Locale>) {
        *self.inner.write() = locale;
    }

    /// Parse and install `tag` (`-` or `_` separated).
    pub fn set_from_tag(&self, tag: &str) -> Result<(), LocaleError> {
        let separator = if tag.contains('_') { '_' } else { '-' };
        let locale = Locale::parse(tag, separator)?;
        self.set(Some(locale));
        Ok(())
    }
}
