//! Typed value extraction on top of [`ResourceManager`] selection.
//!
//! Scalar and array values are chased through `$type:id` references;
//! pattern and theme values are merged along their parent chain with the
//! most-derived item winning. Media and profile values resolve to paths.

use std::{collections::BTreeMap, path::PathBuf};

use log::debug;
use memchr::memchr;
use paste::paste;

use crate::{
    format::{FormatArg, format_template},
    index::ResType,
    manager::{Error, ResourceKey, ResourceManager, ValueHandle},
    plural::PluralCategory,
};

/// A parsed `$[+]type:id` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub res_type: ResType,
    pub id: u32,
}

/// Parse `value` as a reference. Anything not of the exact form
/// `$[+]<type name>:<decimal id>` is a literal.
pub fn parse_reference(value: &str) -> Option<Reference> {
    let rest = value.strip_prefix('$')?;
    let rest = rest.strip_prefix('+').unwrap_or(rest);
    let colon = memchr(b':', rest.as_bytes())?;
    let (type_name, id) = (&rest[..colon], &rest[colon + 1..]);
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Reference {
        res_type: ResType::from_type_name(type_name)?,
        id: id.parse().ok()?,
    })
}

/// Parse `#RGB`, `#ARGB`, `#RRGGBB` or `#AARRGGBB` into ARGB. Missing alpha is opaque.
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let raw = u32::from_str_radix(hex, 16).ok()?;
    let expand = |nibbles: u32, count: u32| {
        (0..count).rev().fold(0u32, |acc, i| {
            let n = (nibbles >> (i * 4)) & 0xf;
            (acc << 8) | (n << 4) | n
        })
    };
    match hex.len() {
        3 => Some(0xff00_0000 | expand(raw, 3)),
        4 => Some(expand(raw, 4)),
        6 => Some(0xff00_0000 | raw),
        8 => Some(raw),
        _ => None,
    }
}

/// Split `48vp` into `(48.0, "vp")`.
pub fn parse_float_with_unit(value: &str) -> Option<(f32, &str)> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    Some((number.parse().ok()?, unit))
}

fn invalid(expected: &'static str, value: &str) -> Error {
    Error::InvalidValue {
        expected,
        value: value.to_owned(),
    }
}

macro_rules! typed_getters {
    ($(
        $(#[$doc:meta])*
        $name:ident($($arg:ident: $arg_ty:ty),*) -> $ret:ty;
    )+) => {
        paste! {
            impl ResourceManager {
                $(
                    $(#[$doc])*
                    pub fn [<get_ $name _by_id>](&self, id: u32 $(, $arg: $arg_ty)*) -> Result<$ret, Error> {
                        self.$name(ResourceKey::Id(id) $(, $arg)*)
                    }

                    $(#[$doc])*
                    pub fn [<get_ $name _by_name>](&self, name: &str $(, $arg: $arg_ty)*) -> Result<$ret, Error> {
                        self.$name(ResourceKey::Name(name) $(, $arg)*)
                    }
                )+
            }
        }
    };
}

typed_getters! {
    /// String value with references resolved.
    string() -> String;
    /// String value formatted with `args`.
    string_format(args: &[FormatArg<'_>]) -> String;
    string_array() -> Vec<String>;
    /// `true`/`false`; any other text is an error.
    boolean() -> bool;
    integer() -> i32;
    /// Numeric prefix of a float value (`48vp` gives `48.0`).
    float() -> f32;
    /// Float value and its unit suffix.
    float_with_unit() -> (f32, String);
    /// ARGB color.
    color() -> u32;
    int_array() -> Vec<i32>;
    /// Pattern attributes merged along the parent chain.
    pattern() -> BTreeMap<String, String>;
    /// Theme attributes merged along the parent chain.
    theme() -> BTreeMap<String, String>;
    /// Plural string for `quantity` under the active language.
    plural_string(quantity: i64) -> String;
    plural_string_format(quantity: i64, args: &[FormatArg<'_>]) -> String;
    /// Path of a profile file relative to the container's resource root.
    profile() -> PathBuf;
    /// Path of a media file relative to the container's resource root.
    media() -> PathBuf;
}

impl ResourceManager {
    /// Selected value of `key`, which must be declared as `res_type`.
    pub fn lookup(&self, key: ResourceKey<'_>, res_type: ResType) -> Result<ValueHandle, Error> {
        let handle = match key {
            ResourceKey::Id(id) => self.select_by_id(id)?,
            ResourceKey::Name(name) => self.select_by_name(res_type, name)?,
        };
        let actual = handle.item().res_type;
        if actual != res_type {
            return Err(Error::TypeMismatch {
                key: key.to_string(),
                expected: res_type,
                actual,
            });
        }
        Ok(handle)
    }

    /// Follow `value` through references until a literal is reached.
    pub fn resolve_reference(&self, value: &str) -> Result<String, Error> {
        let mut current = value.to_owned();
        let mut hops = 0;
        while let Some(reference) = parse_reference(&current) {
            if hops >= self.max_reference_depth {
                debug!("reference chain from `{value}` exceeds {hops} hops");
                return Err(Error::ReferenceTooDeep(value.to_owned()));
            }
            let handle = self.select_by_id(reference.id).map_err(|err| {
                if err.is_not_found() {
                    Error::DanglingReference(current.clone())
                } else {
                    err
                }
            })?;
            let item = handle.item();
            if item.is_array() {
                return Err(Error::ArrayReference(current));
            }
            if item.res_type != reference.res_type {
                return Err(Error::ReferenceTypeMismatch {
                    reference: current,
                    actual: item.res_type,
                });
            }
            current = item
                .value
                .as_scalar()
                .ok_or_else(|| invalid("scalar", &current))?
                .to_owned();
            hops += 1;
        }
        Ok(current)
    }

    fn scalar(&self, key: ResourceKey<'_>, res_type: ResType) -> Result<String, Error> {
        let handle = self.lookup(key, res_type)?;
        let raw = handle
            .item()
            .value
            .as_scalar()
            .ok_or_else(|| invalid(res_type.type_name(), &handle.item().name))?;
        self.resolve_reference(raw)
    }

    fn array(&self, key: ResourceKey<'_>, res_type: ResType) -> Result<Vec<String>, Error> {
        let handle = self.lookup(key, res_type)?;
        let values = handle
            .item()
            .value
            .as_array()
            .ok_or_else(|| invalid(res_type.type_name(), &handle.item().name))?;
        values.iter().map(|v| self.resolve_reference(v)).collect()
    }

    fn string(&self, key: ResourceKey<'_>) -> Result<String, Error> {
        self.scalar(key, ResType::String)
    }

    fn string_format(&self, key: ResourceKey<'_>, args: &[FormatArg<'_>]) -> Result<String, Error> {
        let template = self.string(key)?;
        Ok(format_template(&template, args)?)
    }

    fn string_array(&self, key: ResourceKey<'_>) -> Result<Vec<String>, Error> {
        self.array(key, ResType::StringArray)
    }

    fn boolean(&self, key: ResourceKey<'_>) -> Result<bool, Error> {
        let value = self.scalar(key, ResType::Boolean)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(invalid("boolean", other)),
        }
    }

    fn integer(&self, key: ResourceKey<'_>) -> Result<i32, Error> {
        let value = self.scalar(key, ResType::Integer)?;
        value.trim().parse().map_err(|_| invalid("integer", &value))
    }

    fn float(&self, key: ResourceKey<'_>) -> Result<f32, Error> {
        self.float_with_unit(key).map(|(value, _)| value)
    }

    fn float_with_unit(&self, key: ResourceKey<'_>) -> Result<(f32, String), Error> {
        let value = self.scalar(key, ResType::Float)?;
        parse_float_with_unit(&value)
            .map(|(number, unit)| (number, unit.to_owned()))
            .ok_or_else(|| invalid("float", &value))
    }

    fn color(&self, key: ResourceKey<'_>) -> Result<u32, Error> {
        let value = self.scalar(key, ResType::Color)?;
        parse_color(&value).ok_or_else(|| invalid("color", &value))
    }

    fn int_array(&self, key: ResourceKey<'_>) -> Result<Vec<i32>, Error> {
        self.array(key, ResType::IntArray)?
            .into_iter()
            .map(|v| v.trim().parse().map_err(|_| invalid("integer", &v)))
            .collect()
    }

    fn pattern(&self, key: ResourceKey<'_>) -> Result<BTreeMap<String, String>, Error> {
        self.merged(key, ResType::Pattern)
    }

    fn theme(&self, key: ResourceKey<'_>) -> Result<BTreeMap<String, String>, Error> {
        self.merged(key, ResType::Theme)
    }

    /// Walk the parent chain, keeping the first (most derived) value per key.
    fn merged(
        &self,
        key: ResourceKey<'_>,
        res_type: ResType,
    ) -> Result<BTreeMap<String, String>, Error> {
        let mut handle = self.lookup(key, res_type)?;
        let mut merged = BTreeMap::new();

        for _ in 0..=self.max_reference_depth {
            let item = handle.item();
            let (parent, pairs) = item.split_parent();
            for pair in pairs.chunks_exact(2) {
                if !merged.contains_key(&pair[0]) {
                    let value = self.resolve_reference(&pair[1])?;
                    merged.insert(pair[0].clone(), value);
                }
            }

            let Some(parent) = parent else {
                return Ok(merged);
            };
            let parent_id = parse_reference(parent)
                .map(|r| r.id)
                .or_else(|| parent.parse().ok())
                .ok_or_else(|| Error::MissingParent(parent.to_owned()))?;
            let next = self.select_by_id(parent_id).map_err(|err| {
                if err.is_not_found() {
                    Error::MissingParent(parent.to_owned())
                } else {
                    err
                }
            })?;
            if next.item().res_type != res_type {
                return Err(Error::ReferenceTypeMismatch {
                    reference: parent.to_owned(),
                    actual: next.item().res_type,
                });
            }
            handle = next;
        }
        Err(Error::ReferenceTooDeep(key.to_string()))
    }

    fn plural_string(&self, key: ResourceKey<'_>, quantity: i64) -> Result<String, Error> {
        let handle = self.lookup(key, ResType::Plurals)?;
        let item = handle.item();
        let pairs = item
            .value
            .as_array()
            .ok_or_else(|| invalid("plural", &item.name))?;
        let by_category: BTreeMap<&str, &str> = pairs
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();

        let category = self.plural_category(quantity);
        let raw = by_category
            .get(category.as_str())
            .or_else(|| by_category.get(PluralCategory::Other.as_str()))
            .ok_or_else(|| invalid("plural", &item.name))?;
        self.resolve_reference(raw)
    }

    fn plural_string_format(
        &self,
        key: ResourceKey<'_>,
        quantity: i64,
        args: &[FormatArg<'_>],
    ) -> Result<String, Error> {
        let template = self.plural_string(key, quantity)?;
        Ok(format_template(&template, args)?)
    }

    fn profile(&self, key: ResourceKey<'_>) -> Result<PathBuf, Error> {
        self.path(key, ResType::Profile)
    }

    fn media(&self, key: ResourceKey<'_>) -> Result<PathBuf, Error> {
        self.path(key, ResType::Media)
    }

    /// Path values are not reference-resolved.
    fn path(&self, key: ResourceKey<'_>, res_type: ResType) -> Result<PathBuf, Error> {
        let handle = self.lookup(key, res_type)?;
        let item = handle.item();
        let raw = item
            .value
            .as_scalar()
            .ok_or_else(|| invalid(res_type.type_name(), &item.name))?;
        Ok(handle.container().resource_root().join(raw))
    }
}
