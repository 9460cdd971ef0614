//! Permit search: input normalization, SoQL clause construction, the response
//! cache, the upstream fetcher, and the HTTP routes on top of them.

pub mod cache;
pub mod domain;
pub mod filter;
pub mod params;
pub mod router;
pub mod service;
pub mod upstream;

pub use cache::{cache_key, Clock, ResponseCache, SystemClock};
pub use domain::{FoodTruck, GeoPoint, TruckLocation};
pub use filter::DegreeCell;
pub use params::{
    clamp_limit, ApplicantSearch, Coordinates, NearestSearch, StatusFilter, StreetSearch,
    ValidationError,
};
pub use router::truck_router;
pub use service::{FoodTruckService, SearchError};
pub use upstream::{SodaQuery, UpstreamError, UpstreamFetcher};
