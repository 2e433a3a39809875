//! Speed units, recorded speed-tag parsing, and per-country conventions.
//!
//! Map data records limits as free text (`"50"`, `"30 mph"`, `"signals"`,
//! `"DE:urban"`).  A bare number is read in the country's unit; an explicit
//! suffix always wins.  Comparisons happen in the country's unit so the
//! discrepancy tolerance means "5 of whatever the signs show".

use std::ops::RangeInclusive;

/// Unit system of a speed value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    Mph,
    Kmh,
}

impl SpeedUnit {
    pub const KMH_PER_MPH: f64 = 1.609_344;

    /// Convert `value` expressed in `self` into `to`.
    #[inline]
    pub fn convert(self, value: f64, to: SpeedUnit) -> f64 {
        match (self, to) {
            (SpeedUnit::Mph, SpeedUnit::Kmh) => value * Self::KMH_PER_MPH,
            (SpeedUnit::Kmh, SpeedUnit::Mph) => value / Self::KMH_PER_MPH,
            _ => value,
        }
    }

    /// Recognise a unit suffix anywhere in `text` (case-insensitive).
    pub fn parse_suffix(text: &str) -> Option<SpeedUnit> {
        let lower = text.to_ascii_lowercase();
        if lower.contains("mph") {
            Some(SpeedUnit::Mph)
        } else if ["km/h", "kmh", "kph", "kmph"].iter().any(|s| lower.contains(s)) {
            Some(SpeedUnit::Kmh)
        } else {
            None
        }
    }

    /// Range of values a posted sign can plausibly show in this unit.
    /// Detections outside it are treated as misreads.
    pub fn plausible_range(self) -> RangeInclusive<f64> {
        match self {
            SpeedUnit::Mph => 5.0..=90.0,
            SpeedUnit::Kmh => 10.0..=150.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedUnit::Mph => "mph",
            SpeedUnit::Kmh => "km/h",
        }
    }
}

impl std::fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── RecordedSpeed ─────────────────────────────────────────────────────────────

/// A speed tag from map data, interpreted.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedSpeed {
    /// A numeric limit with its resolved unit.
    Numeric { value: f64, unit: SpeedUnit },
    /// A value without any numeric component (`"signals"`, `"none"`,
    /// `"RU:urban"`, …).
    Qualitative(String),
}

impl RecordedSpeed {
    /// Interpret a raw tag.  The first run of digits (with an optional
    /// decimal part) is the value; `default_unit` applies when the tag has
    /// no unit suffix.  Returns `None` for an empty tag.
    pub fn parse(tag: &str, default_unit: SpeedUnit) -> Option<RecordedSpeed> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }

        let Some(start) = tag.find(|c: char| c.is_ascii_digit()) else {
            return Some(RecordedSpeed::Qualitative(tag.to_owned()));
        };
        let rest = &tag[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = rest[..end].trim_end_matches('.');

        match number.parse::<f64>() {
            Ok(value) => Some(RecordedSpeed::Numeric {
                value,
                unit: SpeedUnit::parse_suffix(tag).unwrap_or(default_unit),
            }),
            Err(_) => Some(RecordedSpeed::Qualitative(tag.to_owned())),
        }
    }

    /// The numeric value converted into `unit`, if there is one.
    pub fn value_in(&self, unit: SpeedUnit) -> Option<f64> {
        match *self {
            RecordedSpeed::Numeric { value, unit: from } => Some(from.convert(value, unit)),
            RecordedSpeed::Qualitative(_) => None,
        }
    }
}

// ── CountryProfile ────────────────────────────────────────────────────────────

/// Which side of the road traffic keeps to (and so where signs stand).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrafficSide {
    Right,
    Left,
}

/// Per-country conventions that affect detection and classification.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryProfile {
    /// Upper-cased ISO 3166-1 alpha-2 code as supplied.
    pub code:         String,
    pub unit:         SpeedUnit,
    pub traffic_side: TrafficSide,
}

/// Countries and territories whose signs are posted in miles per hour.
const MPH_COUNTRIES: &[&str] = &[
    "US", "GB", "UK", "LR", "MM", "PR", "GU", "VI", "AS", "MP", "BS", "BZ", "KY", "VG", "AG",
    "DM", "GD", "KN", "LC", "VC", "AI", "MS", "TC", "FK",
];

const LEFT_HAND_COUNTRIES: &[&str] = &[
    "GB", "UK", "IE", "AU", "NZ", "JP", "IN", "ZA", "HK", "MO", "SG", "MY", "TH", "ID", "KE",
    "PK", "BD", "LK", "NP", "JM", "BS", "CY", "MT", "VG", "KY", "TT", "BB", "FK", "MU", "TZ",
    "UG", "ZM", "ZW", "BW", "NA",
];

impl CountryProfile {
    /// Resolve conventions for an ISO country code.  Unknown codes default
    /// to km/h and right-hand traffic.
    pub fn for_country(code: &str) -> CountryProfile {
        let code = code.trim().to_ascii_uppercase();
        let unit = if MPH_COUNTRIES.contains(&code.as_str()) {
            SpeedUnit::Mph
        } else {
            SpeedUnit::Kmh
        };
        let traffic_side = if LEFT_HAND_COUNTRIES.contains(&code.as_str()) {
            TrafficSide::Left
        } else {
            TrafficSide::Right
        };
        CountryProfile { code, unit, traffic_side }
    }

    /// `true` if a sign reading `value` (in this country's unit) is plausible.
    #[inline]
    pub fn is_plausible(&self, value: f64) -> bool {
        self.unit.plausible_range().contains(&value)
    }

    /// Bearing offset, in degrees, from the direction of travel to the
    /// roadside where signs stand.
    #[inline]
    pub fn roadside_bearing_offset(&self) -> f64 {
        match self.traffic_side {
            TrafficSide::Right => 90.0,
            TrafficSide::Left => -90.0,
        }
    }
}
