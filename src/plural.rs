//! Plural category selection.
//!
//! The engine depends on the [`PluralRuleProvider`] seam only; the default
//! provider is backed by ICU4X compiled CLDR data.

use std::{fmt::Debug, sync::Arc};

use icu_locale_core::Locale as IcuLocale;
use icu_plurals::PluralRuleType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralError {
    #[error("invalid language `{0}` for plural rules")]
    InvalidLanguage(String),

    #[error("no plural rules for `{0}`")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    /// Key used for this category inside plural resources.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl From<icu_plurals::PluralCategory> for PluralCategory {
    fn from(category: icu_plurals::PluralCategory) -> Self {
        match category {
            icu_plurals::PluralCategory::Zero => PluralCategory::Zero,
            icu_plurals::PluralCategory::One => PluralCategory::One,
            icu_plurals::PluralCategory::Two => PluralCategory::Two,
            icu_plurals::PluralCategory::Few => PluralCategory::Few,
            icu_plurals::PluralCategory::Many => PluralCategory::Many,
            icu_plurals::PluralCategory::Other => PluralCategory::Other,
        }
    }
}

/// Plural rules of one language.
pub trait PluralRules: Send + Sync {
    fn category_for(&self, quantity: i64) -> PluralCategory;
}

/// Builds [`PluralRules`] handles; the manager caches what it returns.
pub trait PluralRuleProvider: Debug + Send + Sync {
    fn rules_for(&self, language: &str) -> Result<Arc<dyn PluralRules>, PluralError>;
}

/// Cardinal rules from ICU4X compiled data.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcuPluralProvider;

struct IcuPluralRules(icu_plurals::PluralRules);

impl PluralRules for IcuPluralRules {
    #[inline]
    fn category_for(&self, quantity: i64) -> PluralCategory {
        self.0.category_for(quantity).into()
    }
}

impl PluralRuleProvider for IcuPluralProvider {
    fn rules_for(&self, language: &str) -> Result<Arc<dyn PluralRules>, PluralError> {
        let locale = IcuLocale::try_from_str(language)
            .map_err(|_| PluralError::InvalidLanguage(language.to_owned()))?;
        let rules = icu_plurals::PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into())
            .map_err(|_| PluralError::Unsupported(language.to_owned()))?;
        Ok(Arc::new(IcuPluralRules(rules)))
    }
}
