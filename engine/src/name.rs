//! File name parsing.
//!
//! Names look like `20160825_pge_taxes2016.pdf`: an eight digit date, an
//! underscore, then the destination token (`pge`). Anything after the token
//! is free-form and only kept as part of the base name.

use std::ffi::OsStr;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::error::{DateField, ParseError};
use crate::model::ParsedName;

static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})_([^_.]+)").expect("valid file name regex")
});

/// How many years past the current one a date may be without `force`.
const MAX_YEARS_AHEAD: i32 = 2;

struct RangeCheck {
    field: DateField,
    min: u32,
    max: u32,
}

const YEAR: RangeCheck = RangeCheck { field: DateField::Year, min: 1, max: 9999 };
const MONTH: RangeCheck = RangeCheck { field: DateField::Month, min: 1, max: 12 };
const DAY: RangeCheck = RangeCheck { field: DateField::Day, min: 1, max: 31 };

impl RangeCheck {
    fn verify(&self, value: &str) -> Result<u32, ParseError> {
        let out_of_range = || ParseError::OutOfRange {
            field: self.field,
            value: value.to_string(),
            min: self.min,
            max: self.max,
        };
        let n: u32 = value.parse().map_err(|_| out_of_range())?;
        if n < self.min || n > self.max {
            return Err(out_of_range());
        }
        Ok(n)
    }
}

/// Parse a file name against the current local year.
///
/// With `force` the future-year guard is skipped; range checks always apply.
pub fn parse_file_name(force: bool, base_name: &str) -> Result<ParsedName, ParseError> {
    parse_file_name_at(force, base_name, chrono::Local::now().year())
}

/// Parse a file name, treating `current_year` as "now".
pub fn parse_file_name_at(
    force: bool,
    base_name: &str,
    current_year: i32,
) -> Result<ParsedName, ParseError> {
    let caps = FILE_NAME.captures(base_name).ok_or_else(|| ParseError::Malformed {
        name: base_name.to_string(),
    })?;
    let (year, month, day, destination) = (&caps[1], &caps[2], &caps[3], &caps[4]);

    let year_val = YEAR.verify(year)?;
    let years_ahead = year_val as i32 - current_year;
    if !force && years_ahead > MAX_YEARS_AHEAD {
        return Err(ParseError::Future {
            name: base_name.to_string(),
            years_ahead,
        });
    }
    MONTH.verify(month)?;
    DAY.verify(day)?;

    Ok(ParsedName {
        base_name: base_name.to_string(),
        year: year.to_string(),
        month: month.to_string(),
        day: day.to_string(),
        destination: destination.to_string(),
    })
}

/// Parse a directory entry name. Names that are not valid UTF-8 are malformed.
pub fn parse_os_name(force: bool, name: &OsStr) -> Result<ParsedName, ParseError> {
    match name.to_str() {
        Some(name) => parse_file_name(force, name),
        None => Err(ParseError::Malformed {
            name: name.to_string_lossy().into_owned(),
        }),
    }
}
