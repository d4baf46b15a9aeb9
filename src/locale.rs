//! Locale value type, BCP-47-like tag parsing and the 64-bit locale codec.
//!
//! A [`Locale`] always carries a language; script and region are optional.
//! Subtags are normalised on construction (`zh`, `Hant`, `TW`) so equality
//! is plain string equality.
//!
//! The codec packs a locale into a `u64`:
//!
//! ```text
//! | language: 16 bits | script: 32 bits | region: 16 bits |
//! ```
//!
//! A missing subtag encodes as zero; the all-zero value is the root locale.

pub mod data;
pub mod matcher;
pub mod system;

use std::fmt;

use thiserror::Error;

pub use matcher::{is_more_specific_than, is_more_suitable, matches};
pub use system::SystemLocale;

/// Encoded root locale (no language, script or region).
pub const ROOT_LOCALE: u64 = 0;

const MIN_TAG_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("unsupported locale separator `{0}` (expected `-` or `_`)")]
    InvalidSeparator(char),

    #[error("invalid language subtag `{0}`")]
    LanguageSubtag(String),

    #[error("invalid script subtag `{0}`")]
    ScriptSubtag(String),

    #[error("invalid region subtag `{0}`")]
    RegionSubtag(String),

    #[error("locale tag `{0}` is too short")]
    TooShort(String),
}

/// An immutable `language[-script][-region]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
}

impl Locale {
    /// Parse a tag such as `zh-Hant-TW` or `en_US`.
    ///
    /// Only `-` and `_` are accepted as separators. Tokens after the region
    /// (or any token that is neither a script nor a region) are ignored.
    pub fn parse(tag: &str, separator: char) -> Result<Self, LocaleError> {
        if separator != '-' && separator != '_' {
            return Err(LocaleError::InvalidSeparator(separator));
        }
        if tag.len() < MIN_TAG_LEN {
            return Err(LocaleError::TooShort(tag.to_owned()));
        }

        let mut tokens = tag.split(separator);
        let language = tokens.next().unwrap_or_default();
        if !is_language_subtag(language) {
            return Err(LocaleError::LanguageSubtag(language.to_owned()));
        }

        let mut script = None;
        let mut region = None;
        for token in tokens {
            match token.len() {
                4 if script.is_none() && region.is_none() => {
                    if !is_script_subtag(token) {
                        return Err(LocaleError::ScriptSubtag(token.to_owned()));
                    }
                    script = Some(normalize_script(token));
                }
                2 | 3 if region.is_none() => {
                    if !is_region_subtag(token) {
                        return Err(LocaleError::RegionSubtag(token.to_owned()));
                    }
                    region = Some(token.to_ascii_uppercase());
                }
                _ => break,
            }
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            script,
            region,
        })
    }

    /// Build a locale from discrete parts. Empty strings count as absent.
    pub fn from_parts(
        language: Option<&str>,
        script: Option<&str>,
        region: Option<&str>,
    ) -> Result<Self, LocaleError> {
        let script = script.filter(|s| !s.is_empty());
        let region = region.filter(|s| !s.is_empty());
        let Some(language) = language.filter(|s| !s.is_empty()) else {
            return Err(LocaleError::LanguageSubtag(String::new()));
        };

        if !is_language_subtag(language) {
            return Err(LocaleError::LanguageSubtag(language.to_owned()));
        }
        if let Some(script) = script
            && !is_script_subtag(script)
        {
            return Err(LocaleError::ScriptSubtag(script.to_owned()));
        }
        if let Some(region) = region
            && !is_region_subtag(region)
        {
            return Err(LocaleError::RegionSubtag(region.to_owned()));
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            script: script.map(normalize_script),
            region: region.map(str::to_ascii_uppercase),
        })
    }

    #[inline]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[inline]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    #[inline]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Explicit script, or the likely script for language + region.
    pub fn effective_script(&self) -> Option<&str> {
        self.script
            .as_deref()
            .or_else(|| data::likely_script(&self.language, self.region()))
    }

    /// Copy of this locale with `script` filled in.
    pub fn with_script(&self, script: &str) -> Self {
        Self {
            language: self.language.clone(),
            script: Some(normalize_script(script)),
            region: self.region.clone(),
        }
    }

    #[inline]
    pub fn encode(&self) -> u64 {
        encode(Some(&self.language), self.script(), self.region())
    }

    /// Render with the given separator, e.g. `zh_Hant_TW`.
    pub fn to_tag(&self, separator: char) -> String {
        let mut tag = self.language.clone();
        for part in [self.script(), self.region()].into_iter().flatten() {
            tag.push(separator);
            tag.push_str(part);
        }
        tag
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tag('-'))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Codec
// ─────────────────────────────────────────────────────────────────────────────

/// Pack optional subtags into the 64-bit locale code.
#[inline]
pub fn encode(language: Option<&str>, script: Option<&str>, region: Option<&str>) -> u64 {
    (u64::from(encode_language(language)) << 48)
        | (u64::from(encode_script(script)) << 16)
        | u64::from(encode_region(region))
}

/// Two letters pack as raw bytes; three letters pack as 5-bit offsets from
/// `a` under a high marker bit.
pub fn encode_language(language: Option<&str>) -> u16 {
    match language {
        Some(language) if !language.is_empty() => pack_two_or_three(language.as_bytes(), b'a'),
        _ => 0,
    }
}

/// Letters pack as raw bytes; three-digit (UN M.49) codes pack as offsets from `0`.
pub fn encode_region(region: Option<&str>) -> u16 {
    match region {
        Some(region) if !region.is_empty() => pack_two_or_three(region.as_bytes(), b'0'),
        _ => 0,
    }
}

pub fn encode_script(script: Option<&str>) -> u32 {
    match script {
        Some(script) if script.len() == 4 => {
            let b = script.as_bytes();
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        }
        _ => 0,
    }
}

#[inline]
fn pack_two_or_three(bytes: &[u8], base: u8) -> u16 {
    match bytes {
        [a, b] => (u16::from(*a) << 8) | u16::from(*b),
        [a, b, c, ..] => {
            let first = u16::from(a.wrapping_sub(base) & 0x1f);
            let second = u16::from(b.wrapping_sub(base) & 0x1f);
            let third = u16::from(c.wrapping_sub(base) & 0x1f);
            0x8000 | (first << 10) | (second << 5) | third
        }
        [a] => u16::from(*a) << 8,
        [] => 0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subtag validation
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn is_language_subtag(s: &str) -> bool {
    (2..=3).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

#[inline]
pub(crate) fn is_script_subtag(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_alphabetic())
}

#[inline]
pub(crate) fn is_region_subtag(s: &str) -> bool {
    match s.len() {
        2 => s.bytes().all(|b| b.is_ascii_alphabetic()),
        3 => s.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

fn normalize_script(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    for (i, c) in script.chars().enumerate() {
        if i == 0 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}
