//! Input normalization for the three search modes.
//!
//! Every search parameter type is constructed through a validating
//! constructor, so the clause builder only ever sees clean input.

use std::fmt;

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;
/// Page size requested by the text searches before clamping.
pub const TEXT_SEARCH_LIMIT: f64 = 1000.0;
pub const DEFAULT_NEAREST_LIMIT: f64 = 5.0;
pub const DEFAULT_NEAREST_STATUS: &str = "APPROVED";
const ALL_STATUSES: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Query parameter \"{field}\" is required")]
    MissingText { field: &'static str },
    #[error("Query parameters \"lat\" and \"lng\" are required and must be numbers")]
    InvalidCoordinates,
    #[error("Query parameter \"limit\" must be a positive number")]
    InvalidLimit,
}

/// Clamps a requested page size into `[MIN_LIMIT, MAX_LIMIT]`.
///
/// Zero, negative, and non-finite values collapse to the minimum; fractional
/// values are truncated.
pub fn clamp_limit(requested: f64) -> u32 {
    if !requested.is_finite() || requested < f64::from(MIN_LIMIT) {
        return MIN_LIMIT;
    }
    requested.trunc().min(f64::from(MAX_LIMIT)) as u32
}

/// Permit status restriction. `ALL` (any case) and absence both disable filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Only(String),
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        let normalized = raw.map(|value| value.trim().to_uppercase()).unwrap_or_default();
        if normalized.is_empty() || normalized == ALL_STATUSES {
            Self::Any
        } else {
            Self::Only(normalized)
        }
    }

    /// Like [`StatusFilter::parse`], but absence means `default` rather than no filter.
    pub fn parse_or(raw: Option<&str>, default: &str) -> Self {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Self::parse(Some(value)),
            None => Self::parse(Some(default)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Only(status) => Some(status),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ALL_STATUSES),
            Self::Only(status) => f.write_str(status),
        }
    }
}

/// A point on the globe: latitude in `[-90, 90]`, longitude in `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
            Ok(Self { lat, lng })
        } else {
            Err(ValidationError::InvalidCoordinates)
        }
    }

    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Result<Self, ValidationError> {
        let lat = parse_number(lat).ok_or(ValidationError::InvalidCoordinates)?;
        let lng = parse_number(lng).ok_or(ValidationError::InvalidCoordinates)?;
        Self::new(lat, lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantSearch {
    pub name: String,
    pub status: StatusFilter,
}

impl ApplicantSearch {
    pub fn new(name: Option<&str>, status: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", name)?,
            status: StatusFilter::parse(status),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetSearch {
    pub query: String,
}

impl StreetSearch {
    pub fn new(query: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            query: required_text("query", query)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestSearch {
    pub point: Coordinates,
    pub limit: u32,
    pub status: StatusFilter,
}

impl NearestSearch {
    pub fn new(point: Coordinates, limit: f64, status: StatusFilter) -> Self {
        Self {
            point,
            limit: clamp_limit(limit),
            status,
        }
    }

    /// Builds a nearest search from raw query-string values.
    ///
    /// A missing `limit` means [`DEFAULT_NEAREST_LIMIT`]; a present one must be a
    /// finite number greater than zero. A missing `status` means
    /// [`DEFAULT_NEAREST_STATUS`].
    pub fn from_raw(
        lat: Option<&str>,
        lng: Option<&str>,
        limit: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let point = Coordinates::parse(lat, lng)?;
        let limit = match limit.map(str::trim).filter(|value| !value.is_empty()) {
            None => DEFAULT_NEAREST_LIMIT,
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => value,
                _ => return Err(ValidationError::InvalidLimit),
            },
        };
        let status = StatusFilter::parse_or(status, DEFAULT_NEAREST_STATUS);
        Ok(Self::new(point, limit, status))
    }
}

fn required_text(field: &'static str, raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingText { field }),
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_into_page_bounds() {
        assert_eq!(clamp_limit(0.0), 1);
        assert_eq!(clamp_limit(-3.0), 1);
        assert_eq!(clamp_limit(f64::NAN), 1);
        assert_eq!(clamp_limit(f64::INFINITY), 1);
        assert_eq!(clamp_limit(5.0), 5);
        assert_eq!(clamp_limit(7.9), 7);
        assert_eq!(clamp_limit(500.0), 100);
        assert_eq!(clamp_limit(TEXT_SEARCH_LIMIT), MAX_LIMIT);
    }

    #[test]
    fn status_is_uppercased_and_all_disables_filtering() {
        assert_eq!(StatusFilter::parse(None), StatusFilter::Any);
        assert_eq!(StatusFilter::parse(Some("")), StatusFilter::Any);
        assert_eq!(StatusFilter::parse(Some("all")), StatusFilter::Any);
        assert_eq!(
            StatusFilter::parse(Some("requested")),
            StatusFilter::Only("REQUESTED".to_string())
        );
        assert_eq!(
            StatusFilter::parse_or(None, DEFAULT_NEAREST_STATUS).as_str(),
            Some("APPROVED")
        );
        assert_eq!(StatusFilter::parse_or(Some("All"), "APPROVED"), StatusFilter::Any);
    }

    #[test]
    fn text_searches_require_non_blank_input() {
        assert_eq!(
            ApplicantSearch::new(Some("   "), None),
            Err(ValidationError::MissingText { field: "name" })
        );
        assert_eq!(
            StreetSearch::new(None),
            Err(ValidationError::MissingText { field: "query" })
        );

        let search = ApplicantSearch::new(Some(" taco "), Some("approved")).expect("valid");
        assert_eq!(search.name, "taco");
        assert_eq!(search.status.as_str(), Some("APPROVED"));
    }

    #[test]
    fn nearest_requires_finite_coordinates() {
        assert_eq!(
            NearestSearch::from_raw(None, Some("-122.41"), None, None),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            NearestSearch::from_raw(Some("north"), Some("-122.41"), None, None),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            NearestSearch::from_raw(Some("inf"), Some("-122.41"), None, None),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            Coordinates::new(f64::NAN, 0.0),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn coordinates_outside_the_globe_are_rejected() {
        for (lat, lng) in [("1e19", "-122.41"), ("90.5", "0"), ("0", "-180.01"), ("-91", "10")] {
            assert_eq!(
                NearestSearch::from_raw(Some(lat), Some(lng), None, None),
                Err(ValidationError::InvalidCoordinates),
                "{lat},{lng} should be rejected"
            );
        }
        assert!(Coordinates::new(90.0, -180.0).is_ok());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn nearest_applies_limit_and_status_defaults() {
        let search = NearestSearch::from_raw(Some("37.78"), Some("-122.41"), None, None)
            .expect("valid coordinates");
        assert_eq!(search.limit, 5);
        assert_eq!(search.status, StatusFilter::Only("APPROVED".to_string()));

        let search =
            NearestSearch::from_raw(Some("37.78"), Some("-122.41"), Some("500"), Some("all"))
                .expect("valid coordinates");
        assert_eq!(search.limit, 100);
        assert_eq!(search.status, StatusFilter::Any);
    }

    #[test]
    fn nearest_rejects_non_positive_limit() {
        for raw in ["0", "-2", "many"] {
            assert_eq!(
                NearestSearch::from_raw(Some("37.78"), Some("-122.41"), Some(raw), None),
                Err(ValidationError::InvalidLimit),
                "limit {raw} should be rejected"
            );
        }
    }
}
