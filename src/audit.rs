//! Read-only audit of existing zone metafield formats.
//!
//! Classifies each product's current value into exactly one of
//! `{none, old, new, mixed}` by the presence of the substring "zone"
//! (case-insensitive) in its elements. Issues no writes.

use std::fmt;

use serde::Serialize;

use crate::client::{ProductApi, fetch_all_products};
use crate::error::Result;
use crate::types::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneFormat {
    /// No metafield, or an empty list.
    None,
    /// Every element uses the legacy `"zone-N"` form.
    Old,
    /// No element uses the legacy form.
    New,
    /// At least one element of each form.
    Mixed,
}

impl fmt::Display for ZoneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// Classify a product's current zone values.
pub fn classify(zones: Option<&[String]>) -> ZoneFormat {
    let Some(zones) = zones else {
        return ZoneFormat::None;
    };
    if zones.is_empty() {
        return ZoneFormat::None;
    }
    let legacy = zones
        .iter()
        .filter(|z| z.to_lowercase().contains("zone"))
        .count();
    if legacy == 0 {
        ZoneFormat::New
    } else if legacy == zones.len() {
        ZoneFormat::Old
    } else {
        ZoneFormat::Mixed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub title: String,
    pub format: ZoneFormat,
    pub zones: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub none: usize,
    pub old: usize,
    pub new: usize,
    pub mixed: usize,
    pub products: Vec<AuditEntry>,
}

impl AuditReport {
    fn record(&mut self, product: &Product) {
        let format = classify(product.existing_zones.as_deref());
        self.total += 1;
        match format {
            ZoneFormat::None => self.none += 1,
            ZoneFormat::Old => self.old += 1,
            ZoneFormat::New => self.new += 1,
            ZoneFormat::Mixed => self.mixed += 1,
        }
        self.products.push(AuditEntry {
            id: product.id.clone(),
            title: product.title.clone(),
            format,
            zones: product.existing_zones.clone().unwrap_or_default(),
        });
    }

    pub fn print_summary(&self, verbose: bool) {
        println!();
        println!("=== Audit summary ===");
        println!("  products: {}", self.total);
        println!("  none:     {}", self.none);
        println!("  old:      {}", self.old);
        println!("  new:      {}", self.new);
        println!("  mixed:    {}", self.mixed);
        if verbose {
            for entry in &self.products {
                println!("  [{}] {} {:?}", entry.format, entry.title, entry.zones);
            }
        }
    }
}

/// Crawl all products and classify each one. Read-only.
pub async fn run_audit<A: ProductApi>(api: &A) -> Result<AuditReport> {
    let products = fetch_all_products(api).await?;
    let mut report = AuditReport::default();
    for product in &products {
        report.record(product);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classification_matrix() {
        assert_eq!(classify(None), ZoneFormat::None);
        assert_eq!(classify(Some(&[])), ZoneFormat::None);
        assert_eq!(classify(Some(&zones(&["zone-7"]))), ZoneFormat::Old);
        assert_eq!(classify(Some(&zones(&["7"]))), ZoneFormat::New);
        assert_eq!(classify(Some(&zones(&["zone-7", "7"]))), ZoneFormat::Mixed);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify(Some(&zones(&["Zone-7", "ZONE 8"]))), ZoneFormat::Old);
    }
}
