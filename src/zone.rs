//! ZIP-prefix to USDA hardiness zone lookup.
//!
//! The table keys on the first 3 digits of a ZIP code and stores the dominant
//! zone observed for that prefix in the USDA/PRISM 2023 ZIP-code dataset.
//! Prefix averaging trades precision for a small table: two ZIPs sharing a
//! prefix always resolve identically even when true climate varies within the
//! area. Coverage gaps (unassigned or newly issued prefixes) are genuine and
//! resolve to `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Table generated offline from the USDA/PRISM 2023 dataset.
const BUNDLED_TABLE: &str = include_str!("../data/zip_zones.json");

/// Average annual minimum temperature band for a zone, in degrees Fahrenheit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempRange {
    pub min: i32,
    pub max: i32,
}

/// A resolved zone for a specific ZIP code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneInfo {
    pub zone: String,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    zones: BTreeMap<String, String>,
    ranges: BTreeMap<String, TempRange>,
}

/// Immutable mapping from 3-digit ZIP prefix to hardiness zone.
///
/// Built once by a loader and passed by reference; there is no module-level
/// singleton, so tests can load fixture tables without touching the bundled
/// asset.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    zones: BTreeMap<String, String>,
    ranges: BTreeMap<String, TempRange>,
}

impl ZoneTable {
    /// Load the table bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TABLE)
    }

    /// Parse a table from JSON and verify that every prefix maps to a zone
    /// present in the range map.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(json).map_err(|e| Error::Parse {
            what: "zone table",
            message: e.to_string(),
        })?;
        for (prefix, zone) in &raw.zones {
            if !raw.ranges.contains_key(zone) {
                return Err(Error::Parse {
                    what: "zone table",
                    message: format!("prefix {prefix} maps to unknown zone {zone}"),
                });
            }
        }
        Ok(Self {
            zones: raw.zones,
            ranges: raw.ranges,
        })
    }

    /// Number of prefixes covered.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Resolve a 5-digit ZIP code to its zone and temperature range.
    ///
    /// Returns `None` for input that is not exactly 5 ASCII digits and for
    /// prefixes the table does not cover. An absent prefix is an expected
    /// outcome, not an error.
    pub fn resolve(&self, zip: &str) -> Option<ZoneInfo> {
        if zip.len() != 5 || !zip.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let zone = self.zones.get(&zip[..3])?;
        let range = self.ranges.get(zone)?;
        Some(ZoneInfo {
            zone: zone.clone(),
            min: range.min,
            max: range.max,
        })
    }
}
