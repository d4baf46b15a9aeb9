//! Locale matching and ranking against a requested locale.
//!
//! # Invariants
//!
//! 1. `matches(a, b) == matches(b, a)`.
//! 2. `is_more_suitable(a, b, r) == is_more_suitable(b, a, r).reverse()`.
//! 3. `is_more_suitable` returns `Equal` only for locales that encode identically
//!    (or when both candidates are absent).
//!
//! Ranking order once both candidates survived `matches`:
//! language match → requested pseudo-script → identical region tie-break →
//! requested region → ancestry distance → likely default region → region code.

use std::cmp::Ordering;

use crate::locale::{
    Locale, ROOT_LOCALE,
    data::{self, EQUIVALENT_SCRIPTS, PARENT_LOCALES, PARENT_OVERRIDES, PSEUDO_SCRIPT},
    encode, encode_region,
};

/// Number of ancestors tracked per locale (self included).
const TRACK_PATH_LEN: usize = 5;

/// `true` when a resource qualified with `current` may serve a request for `other`.
///
/// An absent locale matches everything.
pub fn matches(current: Option<&Locale>, other: Option<&Locale>) -> bool {
    let (Some(current), Some(other)) = (current, other) else {
        return true;
    };
    if !languages_equivalent(current.language(), other.language()) {
        return false;
    }
    match (current.effective_script(), other.effective_script()) {
        (Some(a), Some(b)) => scripts_equivalent(a, b),
        // Unknown script: fall back to comparing regions.
        _ => match (current.region(), other.region()) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        },
    }
}

/// Rank `current` against `other` for `request`. `Greater` means `current` wins.
pub fn is_more_suitable(
    current: Option<&Locale>,
    other: Option<&Locale>,
    request: Option<&Locale>,
) -> Ordering {
    let Some(request) = request else {
        // Nothing requested: the unqualified candidate is the closest.
        return match (current, other) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(c), Some(o)) => c.encode().cmp(&o.encode()),
        };
    };

    match (current, other) {
        (None, None) => Ordering::Equal,
        (Some(c), None) => presence_order(c, request),
        (None, Some(o)) => presence_order(o, request).reverse(),
        (Some(c), Some(o)) => compare_present(c, o, request),
    }
}

/// Presence of a locale beats absence; presence of a region beats absence.
pub fn is_more_specific_than(current: Option<&Locale>, other: Option<&Locale>) -> Ordering {
    match (current, other) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(c), Some(o)) => c.region().is_some().cmp(&o.region().is_some()),
    }
}

/// Language equality modulo the legacy/modern code pairs (`iw`/`he`, ...).
#[inline]
pub fn languages_equivalent(a: &str, b: &str) -> bool {
    a == b || data::canonical_language(a) == data::canonical_language(b)
}

#[inline]
fn scripts_equivalent(a: &str, b: &str) -> bool {
    let (x, y) = EQUIVALENT_SCRIPTS;
    a == b || (a == x && b == y) || (a == y && b == x)
}

fn presence_order(present: &Locale, request: &Locale) -> Ordering {
    if languages_equivalent(present.language(), request.language()) {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

fn compare_present(current: &Locale, other: &Locale, request: &Locale) -> Ordering {
    let current_lang = languages_equivalent(current.language(), request.language());
    let other_lang = languages_equivalent(other.language(), request.language());
    if current_lang != other_lang {
        return current_lang.cmp(&other_lang);
    }

    let requested_pseudo = request.script() == Some(PSEUDO_SCRIPT);
    let current_pseudo = current.script() == Some(PSEUDO_SCRIPT);
    let other_pseudo = other.script() == Some(PSEUDO_SCRIPT);
    if current_pseudo != other_pseudo {
        return if current_pseudo == requested_pseudo {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    if current.region() == other.region() {
        return compare_language_codes(current, other, request)
            .then_with(|| compare_explicit_scripts(current, other, request))
            .then_with(|| current.encode().cmp(&other.encode()));
    }

    if current.region() == request.region() {
        return Ordering::Greater;
    }
    if other.region() == request.region() {
        return Ordering::Less;
    }

    let script = request.effective_script();
    let request_path = track_path(request.language(), script, request.region());
    let current_distance = track_distance(
        &request_path,
        &track_path(request.language(), script, current.region()),
    );
    let other_distance = track_distance(
        &request_path,
        &track_path(request.language(), script, other.region()),
    );
    if current_distance != other_distance {
        // Shorter walk to a common ancestor wins.
        return other_distance.cmp(&current_distance);
    }

    let default_region = data::likely_region(request.language(), script);
    let current_default = current.region().is_some() && current.region() == default_region;
    let other_default = other.region().is_some() && other.region() == default_region;
    if current_default != other_default {
        return current_default.cmp(&other_default);
    }

    compare_region_codes(current.region(), other.region())
}

/// Identical-to-request code beats an equivalent one; modern beats legacy.
fn compare_language_codes(current: &Locale, other: &Locale, request: &Locale) -> Ordering {
    let current_identical = current.language() == request.language();
    let other_identical = other.language() == request.language();
    if current_identical != other_identical {
        return current_identical.cmp(&other_identical);
    }
    let current_modern = !data::is_legacy_language(current.language());
    let other_modern = !data::is_legacy_language(other.language());
    current_modern.cmp(&other_modern)
}

fn compare_explicit_scripts(current: &Locale, other: &Locale, request: &Locale) -> Ordering {
    let requested = request.script();
    let current_same = requested.is_some() && current.script() == requested;
    let other_same = requested.is_some() && other.script() == requested;
    current_same.cmp(&other_same)
}

/// Last resort, regions differ: a region beats none, letters beat digits,
/// then the higher encoded region wins.
fn compare_region_codes(current: Option<&str>, other: Option<&str>) -> Ordering {
    match (current, other) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(a), Some(b)) => {
            let a_numeric = a.starts_with(|c: char| c.is_ascii_digit());
            let b_numeric = b.starts_with(|c: char| c.is_ascii_digit());
            if a_numeric != b_numeric {
                return b_numeric.cmp(&a_numeric);
            }
            encode_region(Some(a)).cmp(&encode_region(Some(b)))
        }
    }
}

/// Encoded ancestors of `language-script-region`, root-terminated.
fn track_path(
    language: &str,
    script: Option<&str>,
    region: Option<&str>,
) -> [u64; TRACK_PATH_LEN] {
    let mut path = [ROOT_LOCALE; TRACK_PATH_LEN];
    let mut script = script.map(str::to_owned);
    let mut region = region.map(str::to_owned);

    for slot in path.iter_mut() {
        *slot = encode(Some(language), script.as_deref(), region.as_deref());
        let Some(current_region) = region.take() else {
            break;
        };
        if let Some(parent) = parent_locale(language, script.as_deref(), &current_region) {
            script = parent.script;
            region = parent.region;
        }
    }
    path
}

/// Explicit parent of a regional locale; `None` means "drop the region".
fn parent_locale(language: &str, script: Option<&str>, region: &str) -> Option<Locale> {
    let language = data::canonical_language(language);
    let key = match script {
        Some(script) => format!("{language}-{script}-{region}"),
        None => format!("{language}-{region}"),
    };
    let parent = PARENT_OVERRIDES
        .get(key.as_str())
        .or_else(|| PARENT_LOCALES.get(key.as_str()))?;
    Locale::parse(parent, '-').ok()
}

fn track_distance(request: &[u64], candidate: &[u64]) -> usize {
    for (i, requested) in request.iter().enumerate() {
        if *requested == ROOT_LOCALE {
            break;
        }
        for (j, supported) in candidate.iter().enumerate() {
            if *supported == ROOT_LOCALE {
                break;
            }
            if requested == supported {
                return i + j;
            }
        }
    }
    request.len() + candidate.len()
}
