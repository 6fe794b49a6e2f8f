//! Run-scoped sync report, written once at the end of a completed pass.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::plants::{MatchResult, MatchType};
use crate::types::Product;

/// Report file, overwritten each run.
pub const REPORT_PATH: &str = "zone-sync-report.json";

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub updated: usize,
    pub normalized: usize,
    pub skipped_has_zones: usize,
    pub not_found: usize,
    pub errored: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub title: String,
}

impl ProductRef {
    fn of(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedProduct {
    pub id: String,
    pub title: String,
    pub zones: Vec<String>,
    pub match_type: MatchType,
    pub matched_key: Option<String>,
    /// False when the run was a dry run: the outcome was computed but the
    /// write never happened.
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub id: String,
    pub title: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductError {
    pub id: String,
    pub title: String,
    pub message: String,
}

/// Aggregate counts plus per-product detail for each terminal state.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
    pub counts: Counts,
    pub updated: Vec<UpdatedProduct>,
    pub normalized: Vec<NormalizedProduct>,
    pub skipped: Vec<ProductRef>,
    pub not_found: Vec<ProductRef>,
    pub errors: Vec<ProductError>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            dry_run,
            counts: Counts::default(),
            updated: Vec::new(),
            normalized: Vec::new(),
            skipped: Vec::new(),
            not_found: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record_updated(&mut self, product: &Product, matched: &MatchResult, applied: bool) {
        self.counts.updated += 1;
        self.updated.push(UpdatedProduct {
            id: product.id.clone(),
            title: product.title.clone(),
            zones: matched.zones.clone(),
            match_type: matched.match_type,
            matched_key: matched.matched_key.clone(),
            applied,
        });
    }

    pub fn record_normalized(
        &mut self,
        product: &Product,
        before: Vec<String>,
        after: Vec<String>,
        applied: bool,
    ) {
        self.counts.normalized += 1;
        self.normalized.push(NormalizedProduct {
            id: product.id.clone(),
            title: product.title.clone(),
            before,
            after,
            applied,
        });
    }

    pub fn record_skipped(&mut self, product: &Product) {
        self.counts.skipped_has_zones += 1;
        self.skipped.push(ProductRef::of(product));
    }

    pub fn record_not_found(&mut self, product: &Product) {
        self.counts.not_found += 1;
        self.not_found.push(ProductRef::of(product));
    }

    pub fn record_error(&mut self, product: &Product, message: String) {
        self.counts.errored += 1;
        self.errors.push(ProductError {
            id: product.id.clone(),
            title: product.title.clone(),
            message,
        });
    }

    /// Write the report as pretty JSON, replacing any previous run's file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Parse {
            what: "sync report",
            message: e.to_string(),
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Final summary block, printed whenever a run reaches completion.
    pub fn print_summary(&self) {
        let c = &self.counts;
        println!();
        println!("=== Sync summary{} ===", if self.dry_run { " (dry run)" } else { "" });
        println!("  products:   {}", c.total);
        println!("  updated:    {}", c.updated);
        println!("  normalized: {}", c.normalized);
        println!("  skipped:    {} (already have zones)", c.skipped_has_zones);
        println!("  no match:   {}", c.not_found);
        println!("  errors:     {}", c.errored);
        for err in &self.errors {
            println!("    {} — {}", err.title, err.message);
        }
    }
}
