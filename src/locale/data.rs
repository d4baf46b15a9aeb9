use phf::{Map, phf_map};

// ─────────────────────────────────────────────────────────────────────────────
// Static locale data consumed by the matcher.
//
// Keys follow the tag form the matcher builds at lookup time:
//   "<lang>"                 likely subtags
//   "<lang>-<REGION>"        region-specific script
//   "<lang>-<Script>"        script-specific default region
//   "<lang>-<Script>-<REG>"  parent locales and overrides
// Languages are always the modern code; legacy codes are canonicalised first.
// ─────────────────────────────────────────────────────────────────────────────

/// Legacy (old ISO 639) language codes and their modern replacement.
pub static LEGACY_LANGUAGE_CODES: Map<&'static str, &'static str> = phf_map! {
    "iw" => "he",
    "in" => "id",
    "ji" => "yi",
    "jw" => "jv",
    "tl" => "fil",
};

/// Likely `(script, region)` for a bare language.
pub static LIKELY_SUBTAGS: Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "af" => ("Latn", "ZA"),
    "am" => ("Ethi", "ET"),
    "ar" => ("Arab", "EG"),
    "as" => ("Beng", "IN"),
    "az" => ("Latn", "AZ"),
    "be" => ("Cyrl", "BY"),
    "bg" => ("Cyrl", "BG"),
    "bn" => ("Beng", "BD"),
    "bo" => ("Tibt", "CN"),
    "bs" => ("Latn", "BA"),
    "ca" => ("Latn", "ES"),
    "cs" => ("Latn", "CZ"),
    "cy" => ("Latn", "GB"),
    "da" => ("Latn", "DK"),
    "de" => ("Latn", "DE"),
    "el" => ("Grek", "GR"),
    "en" => ("Latn", "US"),
    "es" => ("Latn", "ES"),
    "et" => ("Latn", "EE"),
    "eu" => ("Latn", "ES"),
    "fa" => ("Arab", "IR"),
    "fi" => ("Latn", "FI"),
    "fil" => ("Latn", "PH"),
    "fr" => ("Latn", "FR"),
    "ga" => ("Latn", "IE"),
    "gl" => ("Latn", "ES"),
    "gu" => ("Gujr", "IN"),
    "ha" => ("Latn", "NG"),
    "he" => ("Hebr", "IL"),
    "hi" => ("Deva", "IN"),
    "hr" => ("Latn", "HR"),
    "hu" => ("Latn", "HU"),
    "hy" => ("Armn", "AM"),
    "id" => ("Latn", "ID"),
    "is" => ("Latn", "IS"),
    "it" => ("Latn", "IT"),
    "ja" => ("Jpan", "JP"),
    "jv" => ("Latn", "ID"),
    "ka" => ("Geor", "GE"),
    "kk" => ("Cyrl", "KZ"),
    "km" => ("Khmr", "KH"),
    "kn" => ("Knda", "IN"),
    "ko" => ("Kore", "KR"),
    "ky" => ("Cyrl", "KG"),
    "lo" => ("Laoo", "LA"),
    "lt" => ("Latn", "LT"),
    "lv" => ("Latn", "LV"),
    "mk" => ("Cyrl", "MK"),
    "ml" => ("Mlym", "IN"),
    "mn" => ("Cyrl", "MN"),
    "mr" => ("Deva", "IN"),
    "ms" => ("Latn", "MY"),
    "my" => ("Mymr", "MM"),
    "nb" => ("Latn", "NO"),
    "ne" => ("Deva", "NP"),
    "nl" => ("Latn", "NL"),
    "or" => ("Orya", "IN"),
    "pa" => ("Guru", "IN"),
    "pl" => ("Latn", "PL"),
    "pt" => ("Latn", "BR"),
    "ro" => ("Latn", "RO"),
    "ru" => ("Cyrl", "RU"),
    "si" => ("Sinh", "LK"),
    "sk" => ("Latn", "SK"),
    "sl" => ("Latn", "SI"),
    "sq" => ("Latn", "AL"),
    "sr" => ("Cyrl", "RS"),
    "sv" => ("Latn", "SE"),
    "sw" => ("Latn", "TZ"),
    "ta" => ("Taml", "IN"),
    "te" => ("Telu", "IN"),
    "th" => ("Thai", "TH"),
    "tr" => ("Latn", "TR"),
    "ug" => ("Arab", "CN"),
    "uk" => ("Cyrl", "UA"),
    "ur" => ("Arab", "PK"),
    "uz" => ("Latn", "UZ"),
    "vi" => ("Latn", "VN"),
    "yi" => ("Hebr", "001"),
    "zh" => ("Hans", "CN"),
    "zu" => ("Latn", "ZA"),
};

/// Script that differs from the language default for a given region.
pub static LIKELY_SCRIPT_BY_REGION: Map<&'static str, &'static str> = phf_map! {
    "zh-TW" => "Hant",
    "zh-HK" => "Hant",
    "zh-MO" => "Hant",
    "sr-ME" => "Latn",
    "sr-XK" => "Latn",
    "uz-AF" => "Arab",
    "pa-PK" => "Arab",
    "az-IR" => "Arab",
    "mn-CN" => "Mong",
    "ms-CC" => "Arab",
};

/// Default region for a language written in a non-default script.
pub static DEFAULT_REGION_BY_SCRIPT: Map<&'static str, &'static str> = phf_map! {
    "zh-Hant" => "TW",
    "sr-Latn" => "RS",
    "uz-Arab" => "AF",
    "pa-Arab" => "PK",
    "az-Arab" => "IR",
    "mn-Mong" => "CN",
    "ms-Arab" => "MY",
};

/// Single exceptions consulted before [`PARENT_LOCALES`].
pub static PARENT_OVERRIDES: Map<&'static str, &'static str> = phf_map! {
    "zh-Hant-MO" => "zh-Hant-HK",
};

/// Non-truncating parents (CLDR `parentLocales` subset).
pub static PARENT_LOCALES: Map<&'static str, &'static str> = phf_map! {
    // International English
    "en-Latn-150" => "en-Latn-001",
    "en-Latn-AG" => "en-Latn-001",
    "en-Latn-AI" => "en-Latn-001",
    "en-Latn-AU" => "en-Latn-001",
    "en-Latn-BB" => "en-Latn-001",
    "en-Latn-BM" => "en-Latn-001",
    "en-Latn-BS" => "en-Latn-001",
    "en-Latn-BW" => "en-Latn-001",
    "en-Latn-BZ" => "en-Latn-001",
    "en-Latn-CA" => "en-Latn-001",
    "en-Latn-CC" => "en-Latn-001",
    "en-Latn-CK" => "en-Latn-001",
    "en-Latn-CM" => "en-Latn-001",
    "en-Latn-CX" => "en-Latn-001",
    "en-Latn-CY" => "en-Latn-001",
    "en-Latn-DG" => "en-Latn-001",
    "en-Latn-DM" => "en-Latn-001",
    "en-Latn-ER" => "en-Latn-001",
    "en-Latn-FJ" => "en-Latn-001",
    "en-Latn-FK" => "en-Latn-001",
    "en-Latn-FM" => "en-Latn-001",
    "en-Latn-GB" => "en-Latn-001",
    "en-Latn-GD" => "en-Latn-001",
    "en-Latn-GG" => "en-Latn-001",
    "en-Latn-GH" => "en-Latn-001",
    "en-Latn-GI" => "en-Latn-001",
    "en-Latn-GM" => "en-Latn-001",
    "en-Latn-GY" => "en-Latn-001",
    "en-Latn-HK" => "en-Latn-001",
    "en-Latn-IE" => "en-Latn-001",
    "en-Latn-IL" => "en-Latn-001",
    "en-Latn-IM" => "en-Latn-001",
    "en-Latn-IN" => "en-Latn-001",
    "en-Latn-IO" => "en-Latn-001",
    "en-Latn-JE" => "en-Latn-001",
    "en-Latn-JM" => "en-Latn-001",
    "en-Latn-KE" => "en-Latn-001",
    "en-Latn-KI" => "en-Latn-001",
    "en-Latn-KN" => "en-Latn-001",
    "en-Latn-KY" => "en-Latn-001",
    "en-Latn-LC" => "en-Latn-001",
    "en-Latn-LR" => "en-Latn-001",
    "en-Latn-LS" => "en-Latn-001",
    "en-Latn-MG" => "en-Latn-001",
    "en-Latn-MO" => "en-Latn-001",
    "en-Latn-MS" => "en-Latn-001",
    "en-Latn-MT" => "en-Latn-001",
    "en-Latn-MU" => "en-Latn-001",
    "en-Latn-MW" => "en-Latn-001",
    "en-Latn-MY" => "en-Latn-001",
    "en-Latn-NA" => "en-Latn-001",
    "en-Latn-NF" => "en-Latn-001",
    "en-Latn-NG" => "en-Latn-001",
    "en-Latn-NR" => "en-Latn-001",
    "en-Latn-NU" => "en-Latn-001",
    "en-Latn-NZ" => "en-Latn-001",
    "en-Latn-PG" => "en-Latn-001",
    "en-Latn-PK" => "en-Latn-001",
    "en-Latn-PN" => "en-Latn-001",
    "en-Latn-PW" => "en-Latn-001",
    "en-Latn-RW" => "en-Latn-001",
    "en-Latn-SB" => "en-Latn-001",
    "en-Latn-SC" => "en-Latn-001",
    "en-Latn-SD" => "en-Latn-001",
    "en-Latn-SG" => "en-Latn-001",
    "en-Latn-SH" => "en-Latn-001",
    "en-Latn-SL" => "en-Latn-001",
    "en-Latn-SS" => "en-Latn-001",
    "en-Latn-SX" => "en-Latn-001",
    "en-Latn-SZ" => "en-Latn-001",
    "en-Latn-TC" => "en-Latn-001",
    "en-Latn-TK" => "en-Latn-001",
    "en-Latn-TO" => "en-Latn-001",
    "en-Latn-TT" => "en-Latn-001",
    "en-Latn-TV" => "en-Latn-001",
    "en-Latn-TZ" => "en-Latn-001",
    "en-Latn-UG" => "en-Latn-001",
    "en-Latn-VC" => "en-Latn-001",
    "en-Latn-VG" => "en-Latn-001",
    "en-Latn-VU" => "en-Latn-001",
    "en-Latn-WS" => "en-Latn-001",
    "en-Latn-ZA" => "en-Latn-001",
    "en-Latn-ZM" => "en-Latn-001",
    "en-Latn-ZW" => "en-Latn-001",
    // European English
    "en-Latn-AT" => "en-Latn-150",
    "en-Latn-BE" => "en-Latn-150",
    "en-Latn-CH" => "en-Latn-150",
    "en-Latn-DE" => "en-Latn-150",
    "en-Latn-DK" => "en-Latn-150",
    "en-Latn-FI" => "en-Latn-150",
    "en-Latn-NL" => "en-Latn-150",
    "en-Latn-SE" => "en-Latn-150",
    "en-Latn-SI" => "en-Latn-150",
    // Latin American Spanish
    "es-Latn-AR" => "es-Latn-419",
    "es-Latn-BO" => "es-Latn-419",
    "es-Latn-BR" => "es-Latn-419",
    "es-Latn-BZ" => "es-Latn-419",
    "es-Latn-CL" => "es-Latn-419",
    "es-Latn-CO" => "es-Latn-419",
    "es-Latn-CR" => "es-Latn-419",
    "es-Latn-CU" => "es-Latn-419",
    "es-Latn-DO" => "es-Latn-419",
    "es-Latn-EC" => "es-Latn-419",
    "es-Latn-GT" => "es-Latn-419",
    "es-Latn-HN" => "es-Latn-419",
    "es-Latn-MX" => "es-Latn-419",
    "es-Latn-NI" => "es-Latn-419",
    "es-Latn-PA" => "es-Latn-419",
    "es-Latn-PE" => "es-Latn-419",
    "es-Latn-PR" => "es-Latn-419",
    "es-Latn-PY" => "es-Latn-419",
    "es-Latn-SV" => "es-Latn-419",
    "es-Latn-US" => "es-Latn-419",
    "es-Latn-UY" => "es-Latn-419",
    "es-Latn-VE" => "es-Latn-419",
    // European Portuguese
    "pt-Latn-AO" => "pt-Latn-PT",
    "pt-Latn-CH" => "pt-Latn-PT",
    "pt-Latn-CV" => "pt-Latn-PT",
    "pt-Latn-FR" => "pt-Latn-PT",
    "pt-Latn-GQ" => "pt-Latn-PT",
    "pt-Latn-GW" => "pt-Latn-PT",
    "pt-Latn-LU" => "pt-Latn-PT",
    "pt-Latn-MO" => "pt-Latn-PT",
    "pt-Latn-MZ" => "pt-Latn-PT",
    "pt-Latn-ST" => "pt-Latn-PT",
    "pt-Latn-TL" => "pt-Latn-PT",
};

/// Scripts that compare equal in `match` even though they encode differently.
pub const EQUIVALENT_SCRIPTS: (&str, &str) = ("Qaag", "Mymr");

/// Pseudo-script that must be requested explicitly to be preferred.
pub const PSEUDO_SCRIPT: &str = "Qaag";

/// Modern code for `language`, or `language` itself.
#[inline]
pub fn canonical_language(language: &str) -> &str {
    LEGACY_LANGUAGE_CODES
        .get(language)
        .copied()
        .unwrap_or(language)
}

#[inline]
pub fn is_legacy_language(language: &str) -> bool {
    LEGACY_LANGUAGE_CODES.contains_key(language)
}

/// Likely script for `language` (optionally narrowed by `region`).
pub fn likely_script(language: &str, region: Option<&str>) -> Option<&'static str> {
    let language = canonical_language(language);
    if let Some(region) = region {
        let key = format!("{language}-{region}");
        if let Some(script) = LIKELY_SCRIPT_BY_REGION.get(key.as_str()) {
            return Some(script);
        }
    }
    LIKELY_SUBTAGS.get(language).map(|(script, _)| *script)
}

/// Likely default region for `language` written in `script`.
pub fn likely_region(language: &str, script: Option<&str>) -> Option<&'static str> {
    let language = canonical_language(language);
    let (default_script, default_region) = LIKELY_SUBTAGS.get(language).copied()?;
    match script {
        None => Some(default_region),
        Some(script) if script == default_script => Some(default_region),
        Some(script) => {
            let key = format!("{language}-{script}");
            DEFAULT_REGION_BY_SCRIPT.get(key.as_str()).copied()
        }
    }
}
