use serde::{Deserialize, Serialize};

use super::observation::full_year;

/// One period of an observer's sites, valid from `since_month/since_year`
/// until the next period starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObserverSite {
    pub code: String,
    pub since_month: u8,
    pub since_year: u8,
    pub main_site: String,
    pub main_region: u8,
    pub secondary_site: Option<String>,
    pub secondary_region: Option<u8>,
    pub active: bool,
}

impl ObserverSite {
    pub fn regions(&self) -> SiteRegions {
        SiteRegions {
            main: self.main_region,
            secondary: self.secondary_region,
        }
    }

    pub fn month_key(&self) -> i32 {
        month_key(self.since_year, self.since_month)
    }
}

/// Regions of an observer's main and secondary site for one month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteRegions {
    pub main: u8,
    pub secondary: Option<u8>,
}

/// Monotonic key for a two-digit year and month.
pub fn month_key(year: u8, month: u8) -> i32 {
    i32::from(month) + 13 * full_year(i16::from(year))
}
