//! Metafield sync driver.
//!
//! Per-product state machine over a full sequential crawl:
//! `fetched -> {skipped | normalized | updated | not_found | errored}`.
//! Writes are strictly serialized with an inter-write pause; a single
//! product's write failure is recorded and the run continues. A pagination
//! failure aborts the run before any report exists.

use std::time::Duration;

use crate::client::{ProductApi, fetch_all_products};
use crate::error::Result;
use crate::plants::PlantDatabase;
use crate::report::SyncReport;
use crate::types::Product;

/// Pause enforced after each metafield write. The platform caps mutation
/// throughput; 500 ms keeps a sequential writer comfortably under it.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(500);

/// Inter-write pause policy, injected so tests run without real delays.
pub trait WritePacer {
    fn after_write(&self) -> Duration;
}

/// Fixed pause after every write; the default policy.
pub struct FixedDelay(pub Duration);

impl WritePacer for FixedDelay {
    fn after_write(&self) -> Duration {
        self.0
    }
}

/// No pause. For tests.
pub struct NoDelay;

impl WritePacer for NoDelay {
    fn after_write(&self) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute and report outcomes without issuing any write.
    pub dry_run: bool,
    /// Rewrite legacy `"zone-N"` values to the plain `"N"` form.
    pub normalize: bool,
}

/// True for values in the legacy `"zone-N"` form.
fn is_legacy_zone(value: &str) -> bool {
    value.to_lowercase().contains("zone")
}

/// `"Zone-7"` -> `"7"`: strip the word "zone", hyphens, and spaces.
fn normalize_zone_value(value: &str) -> String {
    value
        .to_lowercase()
        .replace("zone", "")
        .replace(['-', ' '], "")
}

pub struct SyncDriver<'a, P: WritePacer> {
    plants: &'a PlantDatabase,
    options: SyncOptions,
    pacer: P,
}

impl<'a, P: WritePacer> SyncDriver<'a, P> {
    pub fn new(plants: &'a PlantDatabase, options: SyncOptions, pacer: P) -> Self {
        Self {
            plants,
            options,
            pacer,
        }
    }

    /// Crawl all products and drive each to a terminal state.
    ///
    /// Returns the completed report; the caller decides where to persist it.
    pub async fn run<A: ProductApi>(&self, api: &A) -> Result<SyncReport> {
        let products = fetch_all_products(api).await?;
        tracing::info!(count = products.len(), dry_run = self.options.dry_run, "starting sync pass");

        let mut report = SyncReport::new(self.options.dry_run);
        report.counts.total = products.len();
        for product in &products {
            self.process(api, product, &mut report).await;
        }
        Ok(report)
    }

    async fn process<A: ProductApi>(&self, api: &A, product: &Product, report: &mut SyncReport) {
        if let Some(zones) = product.existing_zones.as_deref()
            && !zones.is_empty()
        {
            if self.options.normalize && zones.iter().any(|z| is_legacy_zone(z)) {
                let after: Vec<String> = zones.iter().map(|z| normalize_zone_value(z)).collect();
                match self.apply(api, product, &after).await {
                    Ok(()) => {
                        tracing::info!(title = %product.title, ?after, "normalized legacy zones");
                        report.record_normalized(product, zones.to_vec(), after, !self.options.dry_run);
                    }
                    Err(e) => {
                        tracing::warn!(title = %product.title, error = %e, "normalize write failed");
                        report.record_error(product, e.to_string());
                    }
                }
            } else {
                tracing::debug!(title = %product.title, "skipped, already has zones");
                report.record_skipped(product);
            }
            return;
        }

        match self.plants.match_title(&product.title) {
            None => {
                tracing::debug!(title = %product.title, "no plant match");
                report.record_not_found(product);
            }
            Some(matched) => match self.apply(api, product, &matched.zones).await {
                Ok(()) => {
                    tracing::info!(
                        title = %product.title,
                        match_type = %matched.match_type,
                        zones = ?matched.zones,
                        "updated zones"
                    );
                    report.record_updated(product, &matched, !self.options.dry_run);
                }
                Err(e) => {
                    tracing::warn!(title = %product.title, error = %e, "zone write failed");
                    report.record_error(product, e.to_string());
                }
            },
        }
    }

    /// Issue one write and pause per the pacer. Dry runs write nothing and
    /// skip the pause.
    async fn apply<A: ProductApi>(
        &self,
        api: &A,
        product: &Product,
        zones: &[String],
    ) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        api.write_zones(product, zones).await?;
        let pause = self.pacer.after_write();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::Error;
    use crate::types::ProductPage;

    fn product(id: &str, title: &str, zones: Option<&[&str]>) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            existing_zones: zones.map(|z| z.iter().map(|s| s.to_string()).collect()),
            metafield_id: zones.map(|_| format!("mf-{id}")),
        }
    }

    /// In-memory ProductApi: pages served by index, writes recorded.
    struct FakeApi {
        pages: Vec<Vec<Product>>,
        writes: RefCell<Vec<(String, Vec<String>)>>,
        fail_write_for: Option<String>,
        fail_pagination: bool,
    }

    impl FakeApi {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                pages: vec![products],
                writes: RefCell::new(Vec::new()),
                fail_write_for: None,
                fail_pagination: false,
            }
        }
    }

    impl ProductApi for FakeApi {
        async fn fetch_page(&self, cursor: Option<&str>) -> Result<ProductPage> {
            if self.fail_pagination {
                return Err(Error::Api {
                    message: "internal server error".to_string(),
                });
            }
            let index: usize = match cursor {
                None => 0,
                Some(c) => c.parse().unwrap(),
            };
            let has_next_page = index + 1 < self.pages.len();
            Ok(ProductPage {
                products: self.pages[index].clone(),
                has_next_page,
                end_cursor: has_next_page.then(|| (index + 1).to_string()),
            })
        }

        async fn write_zones(&self, product: &Product, zones: &[String]) -> Result<()> {
            if self.fail_write_for.as_deref() == Some(product.id.as_str()) {
                return Err(Error::Api {
                    message: "throttled".to_string(),
                });
            }
            self.writes
                .borrow_mut()
                .push((product.id.clone(), zones.to_vec()));
            Ok(())
        }
    }

    fn plants() -> PlantDatabase {
        PlantDatabase::from_json(
            r#"{ "plants": { "red maple": { "zones": ["3", "4", "5", "6", "7", "8", "9"] } } }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_and_not_found() {
        let api = FakeApi::with_products(vec![
            product("1", "Red Maple Tree", None),
            product("2", "Gift Card", None),
        ]);
        let db = plants();
        let driver = SyncDriver::new(&db, SyncOptions::default(), NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert_eq!(report.counts.total, 2);
        assert_eq!(report.counts.updated, 1);
        assert_eq!(report.counts.not_found, 1);
        assert!(report.updated[0].applied);

        let writes = api.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "1");
        assert_eq!(writes[0].1[0], "3");
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_writes() {
        let api = FakeApi::with_products(vec![
            product("1", "Red Maple Tree", None),
            product("2", "Live Oak", Some(&["8", "9"])),
        ]);
        let db = plants();
        let options = SyncOptions {
            dry_run: true,
            normalize: false,
        };
        let driver = SyncDriver::new(&db, options, NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert!(api.writes.borrow().is_empty());
        assert_eq!(report.counts.updated, 1);
        assert_eq!(report.counts.skipped_has_zones, 1);
        assert!(!report.updated[0].applied, "dry-run outcomes are unapplied");
    }

    #[tokio::test]
    async fn test_existing_zones_skipped_without_normalize() {
        let api = FakeApi::with_products(vec![product("1", "Red Maple Tree", Some(&["zone-6"]))]);
        let db = plants();
        let driver = SyncDriver::new(&db, SyncOptions::default(), NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert_eq!(report.counts.skipped_has_zones, 1);
        assert!(api.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_normalize_rewrites_legacy_values() {
        let api = FakeApi::with_products(vec![
            product("1", "Red Maple Tree", Some(&["zone-6", "Zone 7"])),
            product("2", "Live Oak", Some(&["8", "9"])),
        ]);
        let db = plants();
        let options = SyncOptions {
            dry_run: false,
            normalize: true,
        };
        let driver = SyncDriver::new(&db, options, NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert_eq!(report.counts.normalized, 1);
        // Already-normalized zones are left alone.
        assert_eq!(report.counts.skipped_has_zones, 1);

        let writes = api.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, vec!["6", "7"]);
    }

    #[tokio::test]
    async fn test_write_error_recorded_and_run_continues() {
        let mut api = FakeApi::with_products(vec![
            product("1", "Red Maple Tree", None),
            product("2", "Red Maple Bare Root", None),
        ]);
        api.fail_write_for = Some("1".to_string());
        let db = plants();
        let driver = SyncDriver::new(&db, SyncOptions::default(), NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert_eq!(report.counts.errored, 1);
        assert_eq!(report.counts.updated, 1);
        assert!(report.errors[0].message.contains("throttled"));
        assert_eq!(api.writes.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_pagination_failure_aborts_run() {
        let mut api = FakeApi::with_products(vec![product("1", "Red Maple Tree", None)]);
        api.fail_pagination = true;
        let db = plants();
        let driver = SyncDriver::new(&db, SyncOptions::default(), NoDelay);

        // Fatal: no report, no writes.
        assert!(driver.run(&api).await.is_err());
        assert!(api.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_pagination_walks_every_page() {
        let api = FakeApi {
            pages: vec![
                vec![product("1", "Red Maple Tree", None)],
                vec![product("2", "Gift Card", None)],
            ],
            writes: RefCell::new(Vec::new()),
            fail_write_for: None,
            fail_pagination: false,
        };
        let db = plants();
        let driver = SyncDriver::new(&db, SyncOptions::default(), NoDelay);

        let report = driver.run(&api).await.unwrap();
        assert_eq!(report.counts.total, 2);
    }

    #[test]
    fn test_normalize_zone_value() {
        assert_eq!(normalize_zone_value("zone-7"), "7");
        assert_eq!(normalize_zone_value("Zone 10"), "10");
        assert_eq!(normalize_zone_value("7"), "7");
    }
}
