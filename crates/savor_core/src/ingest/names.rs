//! Column-name normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N}]+").expect("valid column-name regex"));

/// Normalizes a spreadsheet field name into a column name.
///
/// Lower-cases the name, collapses each run of non-alphanumeric characters
/// into one `_` and strips leading/trailing `_`. A name without any
/// alphanumeric character becomes `_`.
///
/// # Invariants
/// - Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize_column_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = NON_ALNUM_RUN_RE.replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_column_name;

    #[test]
    fn lowercases_and_collapses_separators() {
        assert_eq!(normalize_column_name("Time In"), "time_in");
        assert_eq!(normalize_column_name("Mental Note"), "mental_note");
        assert_eq!(normalize_column_name("Duration (min)"), "duration_min");
        assert_eq!(normalize_column_name("  Sub-Loc / Area "), "sub_loc_area");
        assert_eq!(normalize_column_name("ID#"), "id");
    }

    #[test]
    fn keeps_non_ascii_letters_and_digits() {
        assert_eq!(normalize_column_name("Café Ort"), "café_ort");
        assert_eq!(normalize_column_name("Dose 2"), "dose_2");
    }

    #[test]
    fn symbol_only_names_collapse_to_underscore() {
        assert_eq!(normalize_column_name("!!!"), "_");
        assert_eq!(normalize_column_name(""), "_");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Time In",
            "__already_clean__",
            "Project Location",
            "Wish-List?",
            "#",
            "ÄRGER Level",
            "time_in",
        ];
        for raw in samples {
            let once = normalize_column_name(raw);
            assert_eq!(normalize_column_name(&once), once, "not idempotent for {raw:?}");
        }
    }
}
