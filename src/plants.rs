//! Plant database and tiered title-to-zone matching.
//!
//! Product titles are free text ("Endless Summer® Hydrangea - 3 Gallon Pot"),
//! so resolution runs a fixed cascade: normalize, exact key, key-inside-title,
//! title-inside-key, then a botanical-term fallback. Each tier only runs when
//! every earlier tier missed. The whole thing is a pure function over an
//! immutable database snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUNDLED_DB: &str = include_str!("../data/plants.json");

/// Shortest database key eligible for a contains match. Anything shorter is
/// too generic to trust as a substring hit.
const MIN_CONTAINS_KEY_LEN: usize = 5;

/// Shortest normalized title eligible for a partial (title-inside-key) match.
const MIN_PARTIAL_TITLE_LEN: usize = 6;

/// Trailing size/packaging/form suffixes, stripped in order. Later patterns
/// assume earlier ones already removed their suffix, so the generic form words
/// come last ("Red Maple Tree 3 Gallon" loses the size first, then "tree").
static SUFFIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "- 3 gallon pot", "5 gal", "2.5 qt container", "4 inch pot"
        r"(?:\s*[-–])?\s*#?\d+(?:\.\d+)?[\s-]*(?:gal(?:lon)?s?|qt|quarts?|inch(?:es)?|in\.|cm)\.?\s*(?:pots?|containers?)?\s*$",
        // "#3 container", "#1 pot"
        r"(?:\s*[-–])?\s*#\s*\d+\s*(?:pots?|containers?)?\s*$",
        r"\s+bare\s*-?\s*root\s*$",
        r"\s+(?:potted|in\s+pot)\s*$",
        r"\s+(?:tree|shrub|bush|plant|vine)\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("suffix pattern"))
    .collect()
});

/// Words the botanical fallback is allowed to match on. Generic descriptive
/// words ("red", "little", "star") are not taxonomically meaningful and must
/// never trigger a match, so the fallback is allow-list only.
const BOTANICAL_TERMS: &[&str] = &[
    "maple",
    "birch",
    "aspen",
    "willow",
    "poplar",
    "redbud",
    "dogwood",
    "magnolia",
    "ginkgo",
    "redwood",
    "cypress",
    "spruce",
    "hemlock",
    "cedar",
    "juniper",
    "arborvitae",
    "apple",
    "cherry",
    "peach",
    "lemon",
    "orange",
    "olive",
    "persimmon",
    "pomegranate",
    "grape",
    "blueberry",
    "raspberry",
    "blackberry",
    "elderberry",
    "hydrangea",
    "lilac",
    "myrtle",
    "forsythia",
    "viburnum",
    "holly",
    "boxwood",
    "azalea",
    "rhododendron",
    "laurel",
    "camellia",
    "gardenia",
    "jasmine",
    "wisteria",
    "honeysuckle",
    "clematis",
    "lavender",
    "coneflower",
    "daisy",
    "sedum",
    "peony",
    "daylily",
    "hosta",
    "hibiscus",
    "fescue",
];

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Contains,
    Partial,
    Botanical,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Contains => write!(f, "contains"),
            Self::Partial => write!(f, "partial"),
            Self::Botanical => write!(f, "botanical"),
        }
    }
}

/// Result of matching one product title. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub zones: Vec<String>,
    pub match_type: MatchType,
    pub matched_key: Option<String>,
    pub matched_word: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDb {
    plants: BTreeMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    zones: Vec<String>,
}

/// Immutable plant-to-zone-range database, keyed by lowercased canonical name.
#[derive(Debug, Clone)]
pub struct PlantDatabase {
    plants: BTreeMap<String, Vec<String>>,
    /// Keys sorted by descending length; contains and botanical tiers scan in
    /// this order so a short generic key never shadows a longer specific one.
    keys_by_len: Vec<String>,
}

impl PlantDatabase {
    /// Load the database bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_DB)
    }

    /// Parse a database from JSON. Keys are lowercased on load.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDb = serde_json::from_str(json).map_err(|e| Error::Parse {
            what: "plant database",
            message: e.to_string(),
        })?;
        let plants: BTreeMap<String, Vec<String>> = raw
            .plants
            .into_iter()
            .map(|(name, entry)| (name.to_lowercase(), entry.zones))
            .collect();
        let mut keys_by_len: Vec<String> = plants.keys().cloned().collect();
        keys_by_len.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(Self {
            plants,
            keys_by_len,
        })
    }

    /// Number of plants in the database.
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Match a free-text product title against the database.
    ///
    /// Tiers, in order:
    /// 1. exact — normalized title is a literal key
    /// 2. contains — a key (len >= 5, longest first) is a substring of the title
    /// 3. partial — the title (len >= 6) is a substring of a key, keys in
    ///    natural order; reversed direction to catch shortened product titles
    /// 4. botanical — an allow-listed word of the title (>4 chars, title
    ///    order) appears in a key, keys longest first
    pub fn match_title(&self, title: &str) -> Option<MatchResult> {
        let name = extract_plant_name(title);
        if name.is_empty() {
            return None;
        }

        if let Some(zones) = self.plants.get(&name) {
            return Some(MatchResult {
                zones: zones.clone(),
                match_type: MatchType::Exact,
                matched_key: Some(name),
                matched_word: None,
            });
        }

        for key in &self.keys_by_len {
            if key.len() >= MIN_CONTAINS_KEY_LEN && name.contains(key.as_str()) {
                return Some(MatchResult {
                    zones: self.plants[key].clone(),
                    match_type: MatchType::Contains,
                    matched_key: Some(key.clone()),
                    matched_word: None,
                });
            }
        }

        if name.len() >= MIN_PARTIAL_TITLE_LEN {
            for (key, zones) in &self.plants {
                if key.contains(&name) {
                    return Some(MatchResult {
                        zones: zones.clone(),
                        match_type: MatchType::Partial,
                        matched_key: Some(key.clone()),
                        matched_word: None,
                    });
                }
            }
        }

        for word in name.split_whitespace().filter(|w| w.len() > 4) {
            if !BOTANICAL_TERMS.contains(&word) {
                continue;
            }
            for key in &self.keys_by_len {
                if key.contains(word) {
                    return Some(MatchResult {
                        zones: self.plants[key].clone(),
                        match_type: MatchType::Botanical,
                        matched_key: Some(key.clone()),
                        matched_word: Some(word.to_string()),
                    });
                }
            }
        }

        None
    }
}

/// Normalize a product title to a candidate plant name.
///
/// Lowercases, strips trademark glyphs, strips trailing size/packaging/form
/// suffixes, and collapses whitespace. Idempotent: a second application is a
/// no-op.
pub fn extract_plant_name(title: &str) -> String {
    let mut name: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '™' | '®' | '©'))
        .collect();
    name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    for pattern in SUFFIX_PATTERNS.iter() {
        if let std::borrow::Cow::Owned(stripped) = pattern.replace(&name, "") {
            name = stripped;
        }
    }
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "plants": {
            "maple": { "zones": ["3", "4", "5"] },
            "japanese maple": { "zones": ["5", "6", "7", "8"] },
            "banana tree": { "zones": ["8", "9", "10", "11"] },
            "eastern redbud": { "zones": ["4", "5", "6", "7", "8", "9"] }
        }
    }"#;

    fn fixture() -> PlantDatabase {
        PlantDatabase::from_json(FIXTURE).unwrap()
    }

    #[test]
    fn test_extract_strips_suffixes_in_order() {
        assert_eq!(extract_plant_name("Red Maple Tree - 3 Gallon Pot"), "red maple");
        assert_eq!(extract_plant_name("Japanese Maple Tree 3 Gallon"), "japanese maple");
        assert_eq!(extract_plant_name("Bing Cherry #5 Container"), "bing cherry");
        assert_eq!(extract_plant_name("Concord Grape Bare Root"), "concord grape");
        assert_eq!(extract_plant_name("Common Lilac Shrub"), "common lilac");
    }

    #[test]
    fn test_extract_strips_trademark_glyphs() {
        assert_eq!(
            extract_plant_name("Endless Summer® Hydrangea"),
            "endless summer hydrangea"
        );
        assert_eq!(extract_plant_name("Knock Out™  Rose"), "knock out rose");
    }

    #[test]
    fn test_extract_is_idempotent() {
        for title in [
            "Red Maple Tree - 3 Gallon Pot",
            "Endless Summer® Hydrangea",
            "Banana Tree",
            "Little Red Shrub",
        ] {
            let once = extract_plant_name(title);
            assert_eq!(extract_plant_name(&once), once, "title: {title}");
        }
    }

    #[test]
    fn test_exact_match_takes_precedence() {
        // "japanese maple" is a literal key; the shorter "maple" key would
        // also satisfy a contains match but must not win.
        let m = fixture().match_title("Japanese Maple Tree - 3 Gallon Pot").unwrap();
        assert_eq!(m.match_type, MatchType::Exact);
        assert_eq!(m.matched_key.as_deref(), Some("japanese maple"));
        assert_eq!(m.zones, vec!["5", "6", "7", "8"]);
    }

    #[test]
    fn test_contains_prefers_longest_key() {
        let m = fixture()
            .match_title("Stunning Japanese Maple Specimen")
            .unwrap();
        assert_eq!(m.match_type, MatchType::Contains);
        assert_eq!(m.matched_key.as_deref(), Some("japanese maple"));
    }

    #[test]
    fn test_partial_matches_shortened_title() {
        // "Banana Tree" normalizes to "banana", which is inside the
        // "banana tree" key.
        let m = fixture().match_title("Banana Tree").unwrap();
        assert_eq!(m.match_type, MatchType::Partial);
        assert_eq!(m.matched_key.as_deref(), Some("banana tree"));
    }

    #[test]
    fn test_botanical_fallback_uses_allow_list() {
        let m = fixture().match_title("Weeping Redbud Variety").unwrap();
        assert_eq!(m.match_type, MatchType::Botanical);
        assert_eq!(m.matched_word.as_deref(), Some("redbud"));
        assert_eq!(m.matched_key.as_deref(), Some("eastern redbud"));
    }

    #[test]
    fn test_no_match_on_generic_words() {
        assert!(fixture().match_title("Little Red Shrub").is_none());
        assert!(fixture().match_title("Gift Card").is_none());
        assert!(fixture().match_title("").is_none());
    }

    #[test]
    fn test_bundled_database() {
        let db = PlantDatabase::bundled().unwrap();
        assert!(!db.is_empty());
        let m = db.match_title("Red Maple Tree").unwrap();
        assert_eq!(m.match_type, MatchType::Exact);
    }
}
