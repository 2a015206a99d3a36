//! Practice theme catalog.

use std::collections::BTreeMap;

/// Theme names mapped to their practice scenarios.
///
/// The persona prompt names the same four themes, so the model and the
/// frontend picker stay in sync.
pub const THEMES: &[(&str, &[&str])] = &[
    (
        "business",
        &[
            "job interview",
            "business meeting",
            "presentation",
            "networking",
        ],
    ),
    ("travel", &["airport", "hotel", "restaurant", "sightseeing"]),
    ("daily life", &["shopping", "weather", "hobbies", "family"]),
    (
        "social",
        &["meeting friends", "party", "social media", "dating"],
    ),
];

/// Returns the catalog as a map, ready for JSON serialization.
pub fn theme_map() -> BTreeMap<&'static str, Vec<&'static str>> {
    THEMES
        .iter()
        .map(|(theme, scenarios)| (*theme, scenarios.to_vec()))
        .collect()
}
