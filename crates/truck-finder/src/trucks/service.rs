use std::sync::Arc;

use tracing::debug;

use super::cache::ResponseCache;
use super::domain::FoodTruck;
use super::filter::{applicant_clause, nearest_clause, street_clause, NEAREST_ORDER};
use super::params::{
    ApplicantSearch, NearestSearch, StreetSearch, ValidationError, TEXT_SEARCH_LIMIT,
};
use super::upstream::{SodaQuery, UpstreamError, UpstreamFetcher};
use crate::config::UpstreamConfig;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// The three search modes exposed over HTTP and the CLI.
#[derive(Debug, Clone)]
pub struct FoodTruckService {
    fetcher: UpstreamFetcher,
}

impl FoodTruckService {
    pub fn new(fetcher: UpstreamFetcher) -> Self {
        Self { fetcher }
    }

    /// Builds the service with its own process-lifetime cache.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl));
        Ok(Self::new(UpstreamFetcher::new(config, cache)?))
    }

    pub async fn search_by_applicant(
        &self,
        search: &ApplicantSearch,
    ) -> Result<Vec<FoodTruck>, UpstreamError> {
        debug!(name = %search.name, status = %search.status, "applicant search");
        let query = SodaQuery::filtered(applicant_clause(search), TEXT_SEARCH_LIMIT);
        self.fetcher.fetch(&query).await
    }

    pub async fn search_by_street(
        &self,
        search: &StreetSearch,
    ) -> Result<Vec<FoodTruck>, UpstreamError> {
        debug!(query = %search.query, "street search");
        let query = SodaQuery::filtered(street_clause(search), TEXT_SEARCH_LIMIT);
        self.fetcher.fetch(&query).await
    }

    /// Trucks in the same whole-degree cell as the point, ordered by applicant
    /// name rather than by distance.
    pub async fn find_nearest(
        &self,
        search: &NearestSearch,
    ) -> Result<Vec<FoodTruck>, UpstreamError> {
        debug!(
            lat = search.point.lat,
            lng = search.point.lng,
            limit = search.limit,
            status = %search.status,
            "nearest search"
        );
        let query = SodaQuery::filtered(nearest_clause(search), f64::from(search.limit))
            .ordered_by(NEAREST_ORDER);
        self.fetcher.fetch(&query).await
    }
}
