//! Qualifier keys (the on-disk "folder" form) and their translation to and
//! from a [`Configuration`].
//!
//! Folder strings follow
//! `language[_Script][_REGION][-direction][-device][-density][-mccN][-mncN]`;
//! a path with no keys is the `default` folder.

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    config::{Configuration, DeviceClass, Direction, ScreenDensity},
    locale::{Locale, is_language_subtag, is_region_subtag, is_script_subtag},
};

pub const DEFAULT_FOLDER: &str = "default";

/// Qualifier keys of one qualified value, in file order.
pub type QualifierPath = SmallVec<[QualifierKey; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualifierError {
    #[error("unrecognised folder segment `{0}`")]
    UnknownSegment(String),

    #[error("folder segment `{0}` repeats a dimension")]
    DuplicateSegment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Language,
    Region,
    ScreenDensity,
    Direction,
    DeviceClass,
    Script,
    Mcc,
    Mnc,
    Other(u32),
}

impl KeyKind {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => KeyKind::Language,
            1 => KeyKind::Region,
            2 => KeyKind::ScreenDensity,
            3 => KeyKind::Direction,
            4 => KeyKind::DeviceClass,
            5 => KeyKind::Script,
            7 => KeyKind::Mcc,
            8 => KeyKind::Mnc,
            other => KeyKind::Other(other),
        }
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        match self {
            KeyKind::Language => 0,
            KeyKind::Region => 1,
            KeyKind::ScreenDensity => 2,
            KeyKind::Direction => 3,
            KeyKind::DeviceClass => 4,
            KeyKind::Script => 5,
            KeyKind::Mcc => 7,
            KeyKind::Mnc => 8,
            KeyKind::Other(raw) => raw,
        }
    }
}

/// One `(kind, raw value)` qualifier param.
///
/// Language, script and region values carry their ASCII bytes packed
/// big-endian into the low bytes of the `u32` (`"zh"` is `0x7a68`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifierKey {
    pub kind: KeyKind,
    pub value: u32,
}

impl QualifierKey {
    #[inline]
    pub const fn new(kind: KeyKind, value: u32) -> Self {
        Self { kind, value }
    }

    pub fn language(language: &str) -> Self {
        Self::new(KeyKind::Language, pack_ascii(language))
    }

    pub fn script(script: &str) -> Self {
        Self::new(KeyKind::Script, pack_ascii(script))
    }

    pub fn region(region: &str) -> Self {
        Self::new(KeyKind::Region, pack_ascii(region))
    }

    pub fn direction(direction: Direction) -> Self {
        Self::new(KeyKind::Direction, direction.raw())
    }

    pub fn device_class(device_class: DeviceClass) -> Self {
        Self::new(KeyKind::DeviceClass, device_class.raw())
    }

    pub fn screen_density(density: ScreenDensity) -> Self {
        Self::new(KeyKind::ScreenDensity, density.raw())
    }

    /// Display form of the raw value.
    pub fn decode(&self) -> String {
        match self.kind {
            KeyKind::Language | KeyKind::Region | KeyKind::Script => unpack_ascii(self.value),
            KeyKind::Direction => Direction::from_raw(self.value)
                .map(|d| d.folder_name().to_owned())
                .unwrap_or_default(),
            KeyKind::DeviceClass => DeviceClass::from_raw(self.value)
                .map(|d| d.folder_name().to_owned())
                .unwrap_or_default(),
            KeyKind::ScreenDensity => ScreenDensity::from_raw(self.value)
                .map(|d| d.folder_name().to_owned())
                .unwrap_or_default(),
            KeyKind::Mcc => format!("mcc{}", self.value),
            KeyKind::Mnc => format!("mnc{:02}", self.value),
            KeyKind::Other(_) => self.value.to_string(),
        }
    }
}

/// Pack up to four ASCII bytes big-endian into the low end of a `u32`.
pub fn pack_ascii(s: &str) -> u32 {
    s.bytes()
        .take(4)
        .fold(0u32, |acc, b| (acc << 8) | u32::from(b))
}

pub fn unpack_ascii(value: u32) -> String {
    value
        .to_be_bytes()
        .iter()
        .filter(|b| **b != 0)
        .map(|b| char::from(*b))
        .collect()
}

/// Build the configuration a qualifier path describes.
///
/// A locale is built only when a language key is present; values that do not
/// decode to a known dimension leave that dimension unset.
pub fn config_from_keys(keys: &[QualifierKey]) -> Configuration {
    let mut config = Configuration::new();
    let mut language = None;
    let mut script = None;
    let mut region = None;

    for key in keys {
        match key.kind {
            KeyKind::Language => language = Some(unpack_ascii(key.value)),
            KeyKind::Script => script = Some(unpack_ascii(key.value)),
            KeyKind::Region => region = Some(unpack_ascii(key.value)),
            KeyKind::Direction => config.set_direction(Direction::from_raw(key.value)),
            KeyKind::DeviceClass => config.set_device_class(DeviceClass::from_raw(key.value)),
            KeyKind::ScreenDensity => {
                config.set_screen_density(ScreenDensity::from_raw(key.value))
            }
            KeyKind::Mcc | KeyKind::Mnc | KeyKind::Other(_) => {}
        }
    }

    if language.is_some() {
        match Locale::from_parts(language.as_deref(), script.as_deref(), region.as_deref()) {
            Ok(locale) => config.set_locale(Some(locale)),
            Err(err) => log::debug!("ignoring locale qualifier: {err}"),
        }
    }
    config
}

/// Canonical folder string for a qualifier path.
pub fn folder_from_keys(keys: &[QualifierKey]) -> String {
    let find = |kind: KeyKind| keys.iter().find(|k| k.kind == kind).map(QualifierKey::decode);

    let mut locale = String::new();
    if let Some(language) = find(KeyKind::Language) {
        locale.push_str(&language);
        for part in [find(KeyKind::Script), find(KeyKind::Region)]
            .into_iter()
            .flatten()
        {
            locale.push('_');
            locale.push_str(&part);
        }
    }

    let segments = [
        Some(locale).filter(|s| !s.is_empty()),
        find(KeyKind::Direction),
        find(KeyKind::DeviceClass),
        find(KeyKind::ScreenDensity),
        find(KeyKind::Mcc),
        find(KeyKind::Mnc),
    ];
    let folder = segments
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if folder.is_empty() {
        DEFAULT_FOLDER.to_owned()
    } else {
        folder
    }
}

/// Parse a canonical folder string back into qualifier keys.
pub fn keys_from_folder(folder: &str) -> Result<QualifierPath, QualifierError> {
    let mut keys = QualifierPath::new();
    if folder == DEFAULT_FOLDER || folder.is_empty() {
        return Ok(keys);
    }

    for (position, segment) in folder.split('-').enumerate() {
        let key = if let Some(direction) = Direction::from_folder_name(segment) {
            QualifierKey::direction(direction)
        } else if let Some(device) = DeviceClass::from_folder_name(segment) {
            QualifierKey::device_class(device)
        } else if let Some(density) = ScreenDensity::from_folder_name(segment) {
            QualifierKey::screen_density(density)
        } else if let Some(mcc) = numeric_suffix(segment, "mcc") {
            QualifierKey::new(KeyKind::Mcc, mcc)
        } else if let Some(mnc) = numeric_suffix(segment, "mnc") {
            QualifierKey::new(KeyKind::Mnc, mnc)
        } else if position == 0 {
            push_locale_keys(&mut keys, segment)?;
            continue;
        } else {
            return Err(QualifierError::UnknownSegment(segment.to_owned()));
        };

        if keys.iter().any(|k| k.kind == key.kind) {
            return Err(QualifierError::DuplicateSegment(segment.to_owned()));
        }
        keys.push(key);
    }
    Ok(keys)
}

fn push_locale_keys(keys: &mut QualifierPath, segment: &str) -> Result<(), QualifierError> {
    let unknown = || QualifierError::UnknownSegment(segment.to_owned());
    let mut parts = segment.split('_');
    let language = parts.next().filter(|l| is_language_subtag(l)).ok_or_else(unknown)?;
    keys.push(QualifierKey::language(language));

    let mut seen_region = false;
    for part in parts {
        if !seen_region && part.len() == 4 && is_script_subtag(part) {
            keys.push(QualifierKey::script(part));
        } else if !seen_region && is_region_subtag(part) {
            keys.push(QualifierKey::region(part));
            seen_region = true;
        } else {
            return Err(unknown());
        }
    }
    Ok(())
}

fn numeric_suffix(segment: &str, prefix: &str) -> Option<u32> {
    let digits = segment.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
