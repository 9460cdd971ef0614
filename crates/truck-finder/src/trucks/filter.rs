//! SoQL `$where` fragments for the three search modes.
//!
//! Only single quotes are escaped (by doubling). Values are always embedded
//! inside single-quoted literals, so that is the whole contract.

use super::params::{ApplicantSearch, Coordinates, NearestSearch, StatusFilter, StreetSearch};

pub const APPLICANT_FIELD: &str = "applicant";
pub const ADDRESS_FIELD: &str = "address";
pub const LOCATION_FIELD: &str = "location";
/// Nearest results are ordered by name; the cell filter is the only proximity signal.
pub const NEAREST_ORDER: &str = "applicant ASC";

pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `upper(field) like upper('%value%')`
pub fn contains_ignore_case(field: &str, value: &str) -> String {
    format!("upper({field}) like upper('%{}%')", escape_literal(value))
}

/// `status = 'VALUE' AND ` or nothing at all when every status is accepted.
pub fn status_prefix(status: &StatusFilter) -> String {
    match status.as_str() {
        Some(value) => format!("status = '{}' AND ", escape_literal(value)),
        None => String::new(),
    }
}

pub fn applicant_clause(search: &ApplicantSearch) -> String {
    format!(
        "{}{}",
        status_prefix(&search.status),
        contains_ignore_case(APPLICANT_FIELD, &search.name)
    )
}

/// Matches the street address only; `locationdescription` is deliberately not consulted.
pub fn street_clause(search: &StreetSearch) -> String {
    contains_ignore_case(ADDRESS_FIELD, &search.query)
}

pub fn nearest_clause(search: &NearestSearch) -> String {
    let cell = DegreeCell::containing(search.point);
    format!(
        "{}{}",
        status_prefix(&search.status),
        cell.within_box(LOCATION_FIELD)
    )
}

/// The whole-degree latitude/longitude cell holding a point.
///
/// Each axis is truncated toward zero; non-negative values span
/// `[trunc, trunc + 1)` and negative values span `[trunc - 1, trunc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeCell {
    pub lat_lower: i64,
    pub lat_upper: i64,
    pub lng_lower: i64,
    pub lng_upper: i64,
}

impl DegreeCell {
    pub fn containing(point: Coordinates) -> Self {
        let (lat_lower, lat_upper) = degree_band(point.lat);
        let (lng_lower, lng_upper) = degree_band(point.lng);
        Self {
            lat_lower,
            lat_upper,
            lng_lower,
            lng_upper,
        }
    }

    /// `within_box(field, north, west, south, east)`, corners given top-left then bottom-right.
    pub fn within_box(&self, field: &str) -> String {
        format!(
            "within_box({field}, {}, {}, {}, {})",
            self.lat_upper, self.lng_lower, self.lat_lower, self.lng_upper
        )
    }
}

fn degree_band(value: f64) -> (i64, i64) {
    let truncated = value.trunc() as i64;
    if value >= 0.0 {
        (truncated, truncated + 1)
    } else {
        (truncated - 1, truncated)
    }
}
