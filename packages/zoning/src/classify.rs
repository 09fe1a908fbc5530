//! Land-use classification for raw zoning codes and permitted-use text.
//!
//! Used when a code is not catalogued in any table: the category is
//! guessed from the shape of the code itself (most Virginia ordinances use
//! the same letter prefixes), and permitted-use strings are scanned for
//! industrial and high-traffic keywords.

use std::sync::LazyLock;

use area_report_zoning_models::LandUseCategory;
use regex::Regex;

use crate::normalize_code;

/// Ordered patterns; the first match wins. Patterns run against the
/// normalized (trimmed, uppercased) code.
static CODE_PATTERNS: LazyLock<Vec<(Regex, LandUseCategory)>> = LazyLock::new(|| {
    [
        (
            r"^(PD-)?(MX|MU|CMU|MUB|MUO|TC)([-0-9].*)?$",
            LandUseCategory::MixedUse,
        ),
        (
            r"^(PD-)?(I|IP|GI|LI|M|CM)-?[0-9]*$",
            LandUseCategory::Industrial,
        ),
        (
            r"^(PD-)?(B|C|CC|GB|O|OP|SC)-?[0-9]*(-[A-Z0-9]+)*$",
            LandUseCategory::Commercial,
        ),
        (
            r"^(PD-)?(R|RC|TR|PDH|CR|TH|MF)-?[0-9]*(-[A-Z0-9]+)*$",
            LandUseCategory::Residential,
        ),
        (
            r"^(A|AG|AC|A-C|AR|JLMA)(-?[0-9]+)?$",
            LandUseCategory::Agricultural,
        ),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).expect("valid regex"), category))
    .collect()
});

const INDUSTRIAL_USE_KEYWORDS: &[&str] = &[
    "manufactur",
    "industrial",
    "warehouse",
    "distribution",
    "storage yard",
    "data center",
    "quarry",
    "wholesale",
];

const HIGH_TRAFFIC_USE_KEYWORDS: &[&str] = &[
    "drive-through",
    "drive-thru",
    "gasoline",
    "service station",
    "fuel",
    "truck",
    "shopping center",
];

/// Guesses a land-use category from the shape of a raw zoning code.
///
/// Returns `None` for codes that follow no recognized convention.
#[must_use]
pub fn classify_raw_code(code: &str) -> Option<LandUseCategory> {
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return None;
    }

    CODE_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(&normalized))
        .map(|(_, category)| *category)
}

/// Whether a permitted use is industrial in nature.
#[must_use]
pub fn is_industrial_use(permitted_use: &str) -> bool {
    contains_any(permitted_use, INDUSTRIAL_USE_KEYWORDS)
}

/// Whether a permitted use generates heavy vehicle traffic.
#[must_use]
pub fn is_high_traffic_use(permitted_use: &str) -> bool {
    contains_any(permitted_use, HIGH_TRAFFIC_USE_KEYWORDS)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_ascii_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword))
}
