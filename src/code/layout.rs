//! Positional layout of the numeric short-entry code.
//!
//! ```text
//! KKOJJ MMTTg ZSZMd DDNCc EEHFV fzzGG 8HHHH sssssssssssssss remarks...
//! 0     5     10    15    20    25    30    35              50
//! ```

use std::ops::Range;

/// Length of the mandatory prefix (KK through GG).
pub const MANDATORY_LEN: usize = 30;
/// Start of the `8HHHH` sun-pillar block.
pub const PILLAR_START: usize = 30;
pub const PILLAR_END: usize = 35;
/// The sector block occupies 15 characters after the pillar block.
pub const SECTOR_START: usize = 35;
pub const SECTOR_LEN: usize = 15;
pub const SECTOR_END: usize = SECTOR_START + SECTOR_LEN;
pub const REMARKS_START: usize = SECTOR_END;
pub const REMARKS_MAX: usize = 60;
/// Hard cap on the buffer: sectors end at 50, remarks add at most 60.
pub const MAX_LEN: usize = REMARKS_START + REMARKS_MAX;

/// Buffer length right after `zz` is complete, where GG auto-fill is considered.
pub const REGION_TRIGGER_LEN: usize = 28;

/// Halo types whose incomplete sightings carry sector notation.
pub const CIRCULAR_HALOS: [u8; 10] = [1, 7, 12, 31, 32, 33, 34, 35, 36, 40];

/// Regions inside 1..=39 that are not assigned.
pub const EXCLUDED_REGIONS: [u8; 5] = [12, 13, 14, 15, 18];

/// Days per month, index 0 unused. February is fixed at 29 regardless of year.
pub const DAYS_IN_MONTH: [u8; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Fields of the mandatory prefix and the optional pillar pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Observer,
    Object,
    Year,
    Month,
    Day,
    Site,
    Hour,
    Minute,
    CirrusDensity,
    Duration,
    CloudCover,
    CirrusType,
    LowClouds,
    HaloType,
    Brightness,
    Color,
    Completeness,
    WeatherFront,
    Precipitation,
    Region,
    PillarUpper,
    PillarLower,
}

impl Field {
    /// The prefix fields in code order.
    pub const PREFIX: [Field; 20] = [
        Field::Observer,
        Field::Object,
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Site,
        Field::Hour,
        Field::Minute,
        Field::CirrusDensity,
        Field::Duration,
        Field::CloudCover,
        Field::CirrusType,
        Field::LowClouds,
        Field::HaloType,
        Field::Brightness,
        Field::Color,
        Field::Completeness,
        Field::WeatherFront,
        Field::Precipitation,
        Field::Region,
    ];

    pub fn span(self) -> Range<usize> {
        match self {
            Field::Observer => 0..2,
            Field::Object => 2..3,
            Field::Year => 3..5,
            Field::Month => 5..7,
            Field::Day => 7..9,
            Field::Site => 9..10,
            Field::Hour => 10..12,
            Field::Minute => 12..14,
            Field::CirrusDensity => 14..15,
            Field::Duration => 15..17,
            Field::CloudCover => 17..18,
            Field::CirrusType => 18..19,
            Field::LowClouds => 19..20,
            Field::HaloType => 20..22,
            Field::Brightness => 22..23,
            Field::Color => 23..24,
            Field::Completeness => 24..25,
            Field::WeatherFront => 25..26,
            Field::Precipitation => 26..28,
            Field::Region => 28..30,
            Field::PillarUpper => 31..33,
            Field::PillarLower => 33..35,
        }
    }

    /// The two-letter (or one-letter) mnemonic used on observation forms.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Field::Observer => "KK",
            Field::Object => "O",
            Field::Year => "JJ",
            Field::Month => "MM",
            Field::Day => "TT",
            Field::Site => "g",
            Field::Hour => "ZS",
            Field::Minute => "ZM",
            Field::CirrusDensity => "d",
            Field::Duration => "DD",
            Field::CloudCover => "N",
            Field::CirrusType => "C",
            Field::LowClouds => "c",
            Field::HaloType => "EE",
            Field::Brightness => "H",
            Field::Color => "F",
            Field::Completeness => "V",
            Field::WeatherFront => "f",
            Field::Precipitation => "zz",
            Field::Region => "GG",
            Field::PillarUpper => "HO",
            Field::PillarLower => "HU",
        }
    }

    /// Field covering buffer offset `pos`, if any.
    pub fn at(pos: usize) -> Option<Field> {
        Field::PREFIX
            .iter()
            .chain([Field::PillarUpper, Field::PillarLower].iter())
            .copied()
            .find(|field| field.span().contains(&pos))
    }

    /// Raw characters of this field, or `None` while the buffer is too short.
    pub fn slice(self, code: &str) -> Option<&str> {
        code.get(self.span())
    }

    /// Numeric value of a fully-entered digit field.
    pub fn number(self, code: &str) -> Option<u8> {
        let raw = self.slice(code)?;
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse().ok()
        } else {
            None
        }
    }
}

pub fn is_circular_halo(halo_type: u8) -> bool {
    CIRCULAR_HALOS.contains(&halo_type)
}

/// Sectors are typed only for incomplete (V=1) circular halos.
pub fn sectors_editable(code: &str) -> bool {
    let incomplete = Field::Completeness.number(code) == Some(1);
    let circular = Field::HaloType.number(code).is_some_and(is_circular_halo);
    incomplete && circular
}

pub fn region_is_valid(region: u8) -> bool {
    (1..=39).contains(&region) && !EXCLUDED_REGIONS.contains(&region)
}

pub fn days_in_month(month: u8) -> u8 {
    DAYS_IN_MONTH.get(month as usize).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_spans_are_contiguous() {
        let mut next = 0;
        for field in Field::PREFIX {
            assert_eq!(field.span().start, next, "{} starts late", field.mnemonic());
            next = field.span().end;
        }
        assert_eq!(next, MANDATORY_LEN);
    }

    #[test]
    fn february_is_always_29() {
        assert_eq!(days_in_month(2), 29);
        assert_eq!(days_in_month(4), 30);
        assert_eq!(days_in_month(13), 0);
    }

    #[test]
    fn field_lookup_by_offset() {
        assert_eq!(Field::at(0), Some(Field::Observer));
        assert_eq!(Field::at(21), Some(Field::HaloType));
        assert_eq!(Field::at(30), None);
        assert_eq!(Field::at(34), Some(Field::PillarLower));
    }

    #[test]
    fn excluded_regions_are_invalid() {
        assert!(region_is_valid(1));
        assert!(region_is_valid(39));
        assert!(!region_is_valid(18));
        assert!(!region_is_valid(0));
        assert!(!region_is_valid(40));
    }
}
