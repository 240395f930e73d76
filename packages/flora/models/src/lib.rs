#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Flowering-tree domain types shared across the bloom-map workspace.
//!
//! Defines the calendar model (month labels and per-species flowering
//! calendars), the prominence categories used to weight colour blending,
//! the RGB flower colour type, and the validated record types the rest of
//! the pipeline consumes. Parsing happens once at the ingestion boundary;
//! everything downstream works with these types and never re-validates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Calendar month labels, in calendar order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: &[Self] = &[
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// Returns the 1-based calendar number of this month (Jan = 1).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Creates a month from a 1-based calendar number.
    ///
    /// # Errors
    ///
    /// Returns an error if the number is not in the range 1-12.
    pub const fn from_number(number: u8) -> Result<Self, InvalidMonthError> {
        match number {
            1 => Ok(Self::Jan),
            2 => Ok(Self::Feb),
            3 => Ok(Self::Mar),
            4 => Ok(Self::Apr),
            5 => Ok(Self::May),
            6 => Ok(Self::Jun),
            7 => Ok(Self::Jul),
            8 => Ok(Self::Aug),
            9 => Ok(Self::Sep),
            10 => Ok(Self::Oct),
            11 => Ok(Self::Nov),
            12 => Ok(Self::Dec),
            _ => Err(InvalidMonthError { number }),
        }
    }
}

/// Error returned when attempting to create a [`Month`] from an invalid
/// calendar number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The invalid month number that was provided.
    pub number: u8,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid month number {}: expected 1-12", self.number)
    }
}

impl std::error::Error for InvalidMonthError {}

/// Per-species flowering calendar: one flag per calendar month.
///
/// Derived once from the species table's textual range specification and
/// queried during monthly aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloweringCalendar {
    months: [bool; 12],
}

impl FloweringCalendar {
    /// Parses a flowering range specification like `"3-5"` or
    /// `"1-2;11-12"`.
    ///
    /// Each `;`-separated segment is an inclusive `start-end` pair of
    /// 1-based month numbers; segments union together, so a month flagged
    /// by any segment stays flagged. A segment whose end month is
    /// numerically smaller than its start wraps across the year boundary:
    /// `"11-2"` covers Nov, Dec, Jan, and Feb. Equal endpoints cover the
    /// single month.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is not two `-`-separated integers or
    /// if an endpoint falls outside 1-12.
    pub fn from_range_spec(spec: &str) -> Result<Self, CalendarParseError> {
        let mut months = [false; 12];

        for segment in spec.split(';') {
            let (start, end) = parse_segment(segment)?;

            // Inclusive walk from start to end, wrapping past Dec when
            // the range crosses the year boundary.
            let mut index = usize::from(start.number()) - 1;
            let last = usize::from(end.number()) - 1;
            loop {
                months[index] = true;
                if index == last {
                    break;
                }
                index = (index + 1) % 12;
            }
        }

        Ok(Self { months })
    }

    /// Returns `true` if the species flowers during `month`.
    #[must_use]
    pub const fn flowers_in(self, month: Month) -> bool {
        self.months[month as usize]
    }

    /// Number of months flagged as flowering.
    #[must_use]
    pub fn flowering_month_count(self) -> usize {
        self.months.iter().filter(|&&flowering| flowering).count()
    }
}

/// Splits one range segment into its start and end months.
fn parse_segment(segment: &str) -> Result<(Month, Month), CalendarParseError> {
    let malformed = || CalendarParseError::MalformedSegment {
        segment: segment.to_string(),
    };

    let mut parts = segment.split('-');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let start: u32 = start.trim().parse().map_err(|_| malformed())?;
    let end: u32 = end.trim().parse().map_err(|_| malformed())?;

    Ok((month_endpoint(start)?, month_endpoint(end)?))
}

/// Converts a parsed endpoint to a [`Month`], rejecting out-of-range
/// values.
fn month_endpoint(number: u32) -> Result<Month, CalendarParseError> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::from_number(n).ok())
        .ok_or(CalendarParseError::MonthOutOfRange { number })
}

/// Error returned when a flowering range specification cannot be parsed.
///
/// Fatal for the species: an unparseable flowering range makes the
/// species unusable for monthly assignment, so ingestion propagates this
/// instead of defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarParseError {
    /// A segment was not two `-`-separated integers.
    MalformedSegment {
        /// The offending segment text.
        segment: String,
    },
    /// A segment endpoint fell outside the 1-12 month range.
    MonthOutOfRange {
        /// The offending endpoint value.
        number: u32,
    },
}

impl std::fmt::Display for CalendarParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedSegment { segment } => write!(
                f,
                "malformed month range segment '{segment}': expected 'start-end' with 1-based month numbers"
            ),
            Self::MonthOutOfRange { number } => {
                write!(f, "month number {number} out of range: expected 1-12")
            }
        }
    }
}

impl std::error::Error for CalendarParseError {}

/// How visually dominant a species' flower colour is.
///
/// The three-level category weighting colour blends; any other value in
/// the species table is rejected at ingestion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Prominence {
    /// Flowers blend into the canopy.
    Low,
    /// Noticeable flowering.
    Med,
    /// Canopy-dominating flowering.
    High,
}

/// An RGB flower colour, parsed from and rendered as `#rrggbb` hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlowerColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl FlowerColor {
    /// Creates a colour from raw channel values.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex colour like `"#ffcc00"`. The leading `#` is optional
    /// and digits are case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly six hex digits after
    /// the optional `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError {
                value: hex.to_string(),
            });
        }

        let channel = |at: usize| {
            u8::from_str_radix(&digits[at..at + 2], 16).map_err(|_| ColorParseError {
                value: hex.to_string(),
            })
        };

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl std::fmt::Display for FlowerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for FlowerColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for FlowerColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<FlowerColor> for String {
    fn from(colour: FlowerColor) -> Self {
        colour.to_string()
    }
}

/// Error returned when a hex colour string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    /// The invalid colour text that was provided.
    pub value: String,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid hex colour '{}': expected '#rrggbb'", self.value)
    }
}

impl std::error::Error for ColorParseError {}

/// Validated per-species metadata, produced once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesAttributes {
    /// Species name; the join key against the census.
    pub name: String,
    /// Which calendar months this species flowers in.
    pub calendar: FloweringCalendar,
    /// Blend weighting category, when the species table records one.
    /// Records without one still occupy their cell but never contribute
    /// to its blended colour.
    pub prominence: Option<Prominence>,
    /// Flower colour.
    pub colour: FlowerColor,
}

/// One geolocated census tree joined with its species metadata.
///
/// Immutable once joined; the species handle is shared across all trees
/// of the same species.
#[derive(Debug, Clone)]
pub struct TreeRecord {
    /// Joined species metadata.
    pub species: Arc<SpeciesAttributes>,
    /// WGS84 latitude in degrees.
    pub latitude: f64,
    /// WGS84 longitude in degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(calendar: FloweringCalendar) -> Vec<Month> {
        Month::ALL
            .iter()
            .copied()
            .filter(|&month| calendar.flowers_in(month))
            .collect()
    }

    #[test]
    fn month_numbers_round_trip() {
        for &month in Month::ALL {
            assert_eq!(Month::from_number(month.number()), Ok(month));
        }
    }

    #[test]
    fn rejects_month_number_zero_and_thirteen() {
        assert!(Month::from_number(0).is_err());
        assert!(Month::from_number(13).is_err());
    }

    #[test]
    fn parses_simple_range() {
        let calendar = FloweringCalendar::from_range_spec("3-5").unwrap();
        assert_eq!(flagged(calendar), vec![Month::Mar, Month::Apr, Month::May]);
    }

    #[test]
    fn parses_multi_range_union() {
        let calendar = FloweringCalendar::from_range_spec("1-2;11-12").unwrap();
        assert_eq!(
            flagged(calendar),
            vec![Month::Jan, Month::Feb, Month::Nov, Month::Dec]
        );
    }

    #[test]
    fn segment_order_does_not_matter() {
        let forward = FloweringCalendar::from_range_spec("1-2;11-12").unwrap();
        let reversed = FloweringCalendar::from_range_spec("11-12;1-2").unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn overlapping_segments_union() {
        let calendar = FloweringCalendar::from_range_spec("3-6;5-8").unwrap();
        assert_eq!(calendar.flowering_month_count(), 6);
        assert!(calendar.flowers_in(Month::Mar));
        assert!(calendar.flowers_in(Month::Aug));
    }

    #[test]
    fn single_month_range() {
        let calendar = FloweringCalendar::from_range_spec("5-5").unwrap();
        assert_eq!(flagged(calendar), vec![Month::May]);
    }

    #[test]
    fn wraps_across_year_boundary() {
        let calendar = FloweringCalendar::from_range_spec("11-2").unwrap();
        assert_eq!(
            flagged(calendar),
            vec![Month::Jan, Month::Feb, Month::Nov, Month::Dec]
        );
    }

    #[test]
    fn rejects_out_of_range_months() {
        assert_eq!(
            FloweringCalendar::from_range_spec("13-14"),
            Err(CalendarParseError::MonthOutOfRange { number: 13 })
        );
        assert!(FloweringCalendar::from_range_spec("0-3").is_err());
    }

    #[test]
    fn rejects_segment_without_dash() {
        assert_eq!(
            FloweringCalendar::from_range_spec("5"),
            Err(CalendarParseError::MalformedSegment {
                segment: "5".to_string()
            })
        );
    }

    #[test]
    fn rejects_non_numeric_segment() {
        assert!(FloweringCalendar::from_range_spec("Mar-May").is_err());
        assert!(FloweringCalendar::from_range_spec("3-5;x").is_err());
        assert!(FloweringCalendar::from_range_spec("1-2-3").is_err());
    }

    #[test]
    fn parses_prominence_categories() {
        assert_eq!("low".parse::<Prominence>(), Ok(Prominence::Low));
        assert_eq!("med".parse::<Prominence>(), Ok(Prominence::Med));
        assert_eq!("high".parse::<Prominence>(), Ok(Prominence::High));
    }

    #[test]
    fn rejects_unrecognized_prominence() {
        assert!("medium".parse::<Prominence>().is_err());
        assert!("HIGH".parse::<Prominence>().is_err());
        assert!("".parse::<Prominence>().is_err());
    }

    #[test]
    fn parses_hex_colour() {
        assert_eq!(
            FlowerColor::from_hex("#bf003f"),
            Ok(FlowerColor::rgb(0xbf, 0x00, 0x3f))
        );
        assert_eq!(
            FlowerColor::from_hex("FFCC00"),
            Ok(FlowerColor::rgb(0xff, 0xcc, 0x00))
        );
    }

    #[test]
    fn renders_lowercase_hex() {
        assert_eq!(FlowerColor::rgb(0xbf, 0x00, 0x3f).to_string(), "#bf003f");
    }

    #[test]
    fn colour_round_trips_through_display() {
        let colour = FlowerColor::rgb(18, 52, 86);
        assert_eq!(colour.to_string().parse::<FlowerColor>(), Ok(colour));
    }

    #[test]
    fn rejects_malformed_hex_colour() {
        assert!(FlowerColor::from_hex("#12345").is_err());
        assert!(FlowerColor::from_hex("zzzzzz").is_err());
        assert!(FlowerColor::from_hex("#1234567").is_err());
        assert!(FlowerColor::from_hex("").is_err());
    }
}
