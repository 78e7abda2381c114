//! Decoded halo observation.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field left open: typed as `/` or blank.
pub const UNSPECIFIED: i16 = -1;
/// `zz` only: precipitation occurred, time unknown.
pub const PRECIPITATION_OCCURRED: i16 = 99;

/// Two-digit years below this belong to the 2000s.
pub const CENTURY_CUTOFF: i16 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    #[serde(rename = "KK")]
    pub observer: i16,
    #[serde(rename = "O")]
    pub object: i16,
    #[serde(rename = "JJ")]
    pub year: i16,
    #[serde(rename = "MM")]
    pub month: i16,
    #[serde(rename = "TT")]
    pub day: i16,
    #[serde(rename = "g")]
    pub site: i16,
    #[serde(rename = "ZS")]
    pub hour: i16,
    #[serde(rename = "ZM")]
    pub minute: i16,
    #[serde(rename = "d")]
    pub cirrus_density: i16,
    #[serde(rename = "DD")]
    pub duration: i16,
    #[serde(rename = "N")]
    pub cloud_cover: i16,
    #[serde(rename = "C")]
    pub cirrus_type: i16,
    #[serde(rename = "c")]
    pub low_clouds: i16,
    #[serde(rename = "EE")]
    pub halo_type: i16,
    #[serde(rename = "H")]
    pub brightness: i16,
    #[serde(rename = "F")]
    pub color: i16,
    #[serde(rename = "V")]
    pub completeness: i16,
    #[serde(rename = "f")]
    pub weather_front: i16,
    #[serde(rename = "zz")]
    pub precipitation: i16,
    #[serde(rename = "GG")]
    pub region: i16,
    #[serde(rename = "HO")]
    pub pillar_upper: i16,
    #[serde(rename = "HU")]
    pub pillar_lower: i16,
    pub sectors: String,
    pub remarks: String,
}

/// A stored observation with its short code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    pub id: String,
    pub code: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub observation: Observation,
}

/// Every field unspecified.
impl Default for Observation {
    fn default() -> Self {
        Self {
            observer: UNSPECIFIED,
            object: UNSPECIFIED,
            year: UNSPECIFIED,
            month: UNSPECIFIED,
            day: UNSPECIFIED,
            site: UNSPECIFIED,
            hour: UNSPECIFIED,
            minute: UNSPECIFIED,
            cirrus_density: UNSPECIFIED,
            duration: UNSPECIFIED,
            cloud_cover: UNSPECIFIED,
            cirrus_type: UNSPECIFIED,
            low_clouds: UNSPECIFIED,
            halo_type: UNSPECIFIED,
            brightness: UNSPECIFIED,
            color: UNSPECIFIED,
            completeness: UNSPECIFIED,
            weather_front: UNSPECIFIED,
            precipitation: UNSPECIFIED,
            region: UNSPECIFIED,
            pillar_upper: UNSPECIFIED,
            pillar_lower: UNSPECIFIED,
            sectors: String::new(),
            remarks: String::new(),
        }
    }
}

impl Observation {
    /// Four-digit year: 00-49 are 2000-2049, 50-99 are 1950-1999.
    pub fn full_year(&self) -> i32 {
        full_year(self.year)
    }

    /// Observer code as typed: `44`, or `A3` for codes 100 and above.
    pub fn observer_code(&self) -> String {
        observer_code(self.observer)
    }

    /// Date, time, then observer, halo type and region.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.full_year()
            .cmp(&other.full_year())
            .then(self.month.cmp(&other.month))
            .then(self.day.cmp(&other.day))
            .then(self.hour.cmp(&other.hour))
            .then(self.minute.cmp(&other.minute))
            .then(self.observer.cmp(&other.observer))
            .then(self.halo_type.cmp(&other.halo_type))
            .then(self.region.cmp(&other.region))
    }
}

pub fn full_year(year: i16) -> i32 {
    let year = i32::from(year);
    if year < i32::from(CENTURY_CUTOFF) {
        2000 + year
    } else {
        1900 + year
    }
}

/// Numeric observer code for the two characters of KK. A leading letter
/// counts as 10 for `A`, 11 for `B`, and so on.
pub fn observer_number(code: &str) -> Option<i16> {
    let mut chars = code.chars();
    let lead = chars.next()?;
    let trail = chars.next()?.to_digit(10)?;
    if chars.next().is_some() {
        return None;
    }
    let tens = match lead {
        '0'..='9' => lead.to_digit(10)?,
        'A'..='Z' => 10 + (lead as u32 - 'A' as u32),
        _ => return None,
    };
    i16::try_from(tens * 10 + trail).ok()
}

/// Inverse of [`observer_number`]. Anything outside 0-359 is `//`.
pub fn observer_code(number: i16) -> String {
    if !(0..360).contains(&number) {
        return "//".to_string();
    }
    let tens = number / 10;
    let unit = number % 10;
    if tens >= 10 {
        let letter = char::from(b'A' + (tens - 10) as u8);
        format!("{letter}{unit}")
    } else {
        format!("{number:02}")
    }
}
