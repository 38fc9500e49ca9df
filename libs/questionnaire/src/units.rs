//! Unit label to UCUM resolution for durations

use crate::urls;
use phf::phf_map;

/// UCUM code for the time unit labels offered by the builder
static TIME_UNITS: phf::Map<&'static str, &'static str> = phf_map! {
    "years" => "a",
    "months" => "mo",
    "weeks" => "wk",
    "days" => "d",
    "hours" => "h",
    "minutes" => "min",
    "seconds" => "s",
};

/// A UCUM system/code pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UcumUnit {
    pub system: String,
    pub code: String,
}

/// Resolves a human unit label to its UCUM coding.
pub trait UnitResolver: Send + Sync {
    fn resolve(&self, label: &str) -> Option<UcumUnit>;
}

/// Fixed table of the time units used by observation link periods
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeUnits;

impl UnitResolver for TimeUnits {
    fn resolve(&self, label: &str) -> Option<UcumUnit> {
        TIME_UNITS.get(label).map(|code| UcumUnit {
            system: urls::UCUM.to_string(),
            code: (*code).to_string(),
        })
    }
}

/// Label for a UCUM time code, the inverse of [`TimeUnits`]
pub fn time_unit_label(code: &str) -> Option<&'static str> {
    TIME_UNITS
        .entries()
        .find(|(_, c)| **c == code)
        .map(|(label, _)| *label)
}
