//! Characters the entry dialog injects without the observer typing them.
//!
//! After every accepted keystroke the validator asks [`next_fill`] what comes
//! next: a run of fixed characters, a region lookup, or nothing.

use serde::Serialize;

use crate::{log_debug, models::SiteRegions};

use super::{
    buffer::InputBuffer,
    layout::{
        sectors_editable, Field, PILLAR_END, PILLAR_START, REGION_TRIGGER_LEN, SECTOR_END,
        SECTOR_START,
    },
};

const ENABLE_LOGS: bool = false;

/// Marks a template position the observer types.
pub const USER_SLOT: u8 = b'H';

/// Shape of the `8HHHH` block for a halo type.
pub fn pillar_template(halo_type: Option<u8>) -> &'static str {
    match halo_type {
        Some(8) => "8HH//",
        Some(9) => "8//HH",
        Some(10) => "8HHHH",
        _ => "8////",
    }
}

/// Which of the observer's sites an observation was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SiteSelector {
    Main,
    Secondary,
}

impl SiteSelector {
    /// `g` = 0 and 2 name a registered site; 1 means the region is typed.
    pub fn from_code(site: u8) -> Option<Self> {
        match site {
            0 => Some(SiteSelector::Main),
            2 => Some(SiteSelector::Secondary),
            _ => None,
        }
    }

    pub fn pick(self, regions: &SiteRegions) -> Option<u8> {
        match self {
            SiteSelector::Main => Some(regions.main),
            SiteSelector::Secondary => regions.secondary,
        }
    }
}

/// Request for the observer's region in a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRequest {
    pub observer: String,
    pub year: u8,
    pub month: u8,
    pub site: SiteSelector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    Append(String),
    LookupRegion(RegionRequest),
    Idle,
}

pub fn next_fill(buffer: &InputBuffer) -> Fill {
    let code = buffer.as_str();
    let len = buffer.len();

    if len == REGION_TRIGGER_LEN {
        return region_request(code).map_or(Fill::Idle, Fill::LookupRegion);
    }

    if (PILLAR_START..PILLAR_END).contains(&len) {
        let template = pillar_template(Field::HaloType.number(code));
        let fixed: String = template[len - PILLAR_START..]
            .chars()
            .take_while(|&ch| ch != USER_SLOT as char)
            .collect();
        if fixed.is_empty() {
            return Fill::Idle;
        }
        log_debug!("pillar block {template}: filling '{fixed}' at {len}");
        return Fill::Append(fixed);
    }

    if (SECTOR_START..SECTOR_END).contains(&len) {
        let terminated = code[SECTOR_START..].contains(' ');
        if terminated || !sectors_editable(code) {
            log_debug!("padding sector block with {} spaces", SECTOR_END - len);
            return Fill::Append(" ".repeat(SECTOR_END - len));
        }
    }

    Fill::Idle
}

fn region_request(code: &str) -> Option<RegionRequest> {
    let site = SiteSelector::from_code(Field::Site.number(code)?)?;
    Some(RegionRequest {
        observer: Field::Observer.slice(code)?.to_string(),
        year: Field::Year.number(code)?,
        month: Field::Month.number(code)?,
        site,
    })
}

/// Two-digit region text for a resolved lookup.
pub fn region_digits(region: u8) -> String {
    format!("{region:02}")
}
