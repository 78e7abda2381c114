//! Where GG auto-fill gets its regions from.

use std::{collections::HashMap, future::Future};

use anyhow::Result;

use crate::{
    db::Database,
    models::{month_key, ObserverSite, SiteRegions},
};

/// Observer registry consulted by the entry session.
pub trait ObserverDirectory: Send + Sync + 'static {
    /// Regions in force for `observer` during `month` of two-digit `year`.
    fn lookup_region(
        &self,
        observer: &str,
        year: u8,
        month: u8,
    ) -> impl Future<Output = Result<Option<SiteRegions>>> + Send;

    /// Codes a session accepts at KK.
    fn known_codes(&self, active_only: bool) -> impl Future<Output = Result<Vec<String>>> + Send;
}

impl ObserverDirectory for Database {
    async fn lookup_region(
        &self,
        observer: &str,
        year: u8,
        month: u8,
    ) -> Result<Option<SiteRegions>> {
        self.find_site_regions(observer, year, month).await
    }

    async fn known_codes(&self, active_only: bool) -> Result<Vec<String>> {
        self.list_observer_codes(active_only).await
    }
}

/// Site periods held in memory, keyed by observer code.
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    sites: HashMap<String, Vec<ObserverSite>>,
}

impl SiteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: ObserverSite) {
        let periods = self.sites.entry(site.code.to_ascii_uppercase()).or_default();
        periods.retain(|existing| existing.month_key() != site.month_key());
        periods.push(site);
        periods.sort_by_key(ObserverSite::month_key);
    }

    pub fn regions(&self, observer: &str, year: u8, month: u8) -> Option<SiteRegions> {
        let key = month_key(year, month);
        self.sites
            .get(&observer.to_ascii_uppercase())?
            .iter()
            .rev()
            .find(|site| site.month_key() <= key)
            .map(ObserverSite::regions)
    }
}

impl FromIterator<ObserverSite> for SiteTable {
    fn from_iter<I: IntoIterator<Item = ObserverSite>>(iter: I) -> Self {
        let mut table = SiteTable::new();
        iter.into_iter().for_each(|site| table.insert(site));
        table
    }
}

impl ObserverDirectory for SiteTable {
    async fn lookup_region(
        &self,
        observer: &str,
        year: u8,
        month: u8,
    ) -> Result<Option<SiteRegions>> {
        Ok(self.regions(observer, year, month))
    }

    async fn known_codes(&self, active_only: bool) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self
            .sites
            .iter()
            .filter(|(_, periods)| !active_only || periods.iter().any(|site| site.active))
            .map(|(code, _)| code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }
}
