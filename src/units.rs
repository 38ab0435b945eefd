//! Unit label normalization: stable codes, region extraction, city guessing
//! and slug construction. Pure functions over two ordered lookup tables.

/// Known unit labels with fixed codes, matched after trimming. Includes a few
/// spelling variants seen in real source sheets. Everything absent from this
/// table falls through to generic normalization.
const SPECIAL_CODES: &[(&str, &str)] = &[
    ("Square Meter", "SQ_M"),
    ("Square Meters", "SQ_M"),
    ("Square Meteres", "SQ_M"),
    ("Square Feet", "SQ_FT"),
    ("Square Foot", "SQ_FT"),
    ("Square Yard", "SQ_YD"),
    ("Square Inch", "SQ_IN"),
    ("Square Kilometer", "SQ_KM"),
    ("Square Mile", "SQ_MI"),
    ("Acre", "ACRE"),
    ("Hectare", "HECTARE"),
];

/// Region token to representative city, scanned in order: the first listed
/// region that matches wins, so this is an explicit priority list.
const REGION_TO_CITY: &[(&str, &str)] = &[
    ("Assam", "Guwahati"),
    ("Bengal", "Kolkata"),
    ("Bihar", "Patna"),
    ("Jharkhand", "Ranchi"),
    ("Tripura", "Agartala"),
    ("Gujarat", "Ahmedabad"),
    ("Rajasthan", "Jaipur"),
    ("Punjab", "Chandigarh"),
    ("Haryana", "Gurugram"),
    ("HP", "Shimla"),
    ("Himachal", "Shimla"),
    ("Uttarakhand", "Dehradun"),
    ("UP", "Lucknow"),
    ("MP", "Bhopal"),
];

/// Turn a human-readable unit label into a stable code,
/// e.g. `Bigha – Assam` becomes `BIGHA_ASSAM`.
///
/// An all-punctuation label yields an empty code; the source sheets never
/// contain one, so this degenerate case is not guarded.
pub fn normalize_code(label: &str) -> String {
    let clean = label.trim();

    for (known, code) in SPECIAL_CODES {
        if clean == *known {
            return (*code).to_string();
        }
    }

    let mut out = String::with_capacity(clean.len());
    for ch in clean.chars() {
        if ch.is_ascii_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Extract a region/state hint from labels like `Bigha – Assam`, `Dhur-Bihar`
/// or `Bigha-Uttarakhand-II`. The last separator-delimited part is treated as
/// the region. Returns `None` when no separator splits the label into at
/// least two non-empty parts; callers default to "Pan-India".
pub fn extract_region(label: &str) -> Option<String> {
    let name = label.trim();

    for sep in ['–', '—', '-'] {
        if name.contains(sep) {
            let parts: Vec<&str> = name
                .split(sep)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if parts.len() >= 2 {
                return parts.last().map(|part| (*part).to_string());
            }
        }
    }

    None
}

/// Pick a representative city from region tokens present in either label,
/// from-label first; fall back to `default_city`.
pub fn guess_city(from_label: &str, to_label: &str, default_city: &str) -> String {
    for label in [from_label, to_label] {
        let lowered = label.to_lowercase();
        for (region, city) in REGION_TO_CITY {
            if lowered.contains(&region.to_lowercase()) {
                return (*city).to_string();
            }
        }
    }
    default_city.to_string()
}

/// URL-safe slug from two unit codes, e.g. `BIGHA_ASSAM` + `ACRE` becomes
/// `bigha-assam-to-acre`.
pub fn build_slug(from_code: &str, to_code: &str) -> String {
    let norm = |code: &str| code.to_lowercase().replace('_', "-");
    format!("{}-to-{}", norm(from_code), norm(to_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_code_uses_special_table_for_known_labels() {
        assert_eq!(normalize_code("Square Meter"), "SQ_M");
        assert_eq!(normalize_code("  Square Feet  "), "SQ_FT");
        assert_eq!(normalize_code("Acre"), "ACRE");
        assert_eq!(normalize_code("Hectare"), "HECTARE");
    }

    #[test]
    fn normalize_code_collapses_separator_runs() {
        assert_eq!(normalize_code("Bigha – Assam"), "BIGHA_ASSAM");
        assert_eq!(normalize_code("Dhur-Bihar"), "DHUR_BIHAR");
        assert_eq!(normalize_code("Bigha-Uttarakhand-II"), "BIGHA_UTTARAKHAND_II");
        assert_eq!(normalize_code("Ground"), "GROUND");
    }

    #[test]
    fn normalize_code_never_leaves_edge_underscores() {
        assert_eq!(normalize_code("-Kanal-"), "KANAL");
        assert_eq!(normalize_code("---"), "");
    }

    #[test]
    fn extract_region_returns_last_non_empty_segment() {
        assert_eq!(extract_region("Bigha – Assam"), Some("Assam".to_string()));
        assert_eq!(extract_region("Dhur-Bihar"), Some("Bihar".to_string()));
        assert_eq!(
            extract_region("Bigha-Uttarakhand-II"),
            Some("II".to_string())
        );
    }

    #[test]
    fn extract_region_without_separator_is_none() {
        assert_eq!(extract_region("Acre"), None);
        assert_eq!(extract_region("Hectare"), None);
    }

    #[test]
    fn extract_region_splits_hyphenated_names_too() {
        // "Pan-India" is the callers' *default* region, never an input label,
        // so the hyphen split applying to it is harmless and deliberate.
        assert_eq!(extract_region("Pan-India"), Some("India".to_string()));
    }

    #[test]
    fn guess_city_matches_from_label_first() {
        assert_eq!(guess_city("Bigha - Assam", "Acre", "Mumbai"), "Guwahati");
        assert_eq!(
            guess_city("Katha - Bengal", "Dhur - Bihar", "Mumbai"),
            "Kolkata"
        );
    }

    #[test]
    fn guess_city_is_case_insensitive_and_falls_back() {
        assert_eq!(guess_city("bigha - ASSAM", "Acre", "Mumbai"), "Guwahati");
        assert_eq!(guess_city("Acre", "Hectare", "Mumbai"), "Mumbai");
    }

    #[test]
    fn build_slug_joins_lowercased_codes() {
        assert_eq!(build_slug("BIGHA_ASSAM", "ACRE"), "bigha-assam-to-acre");
        assert_eq!(build_slug("SQ_M", "SQ_FT"), "sq-m-to-sq-ft");
    }
}
