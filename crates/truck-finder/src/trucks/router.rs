use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::domain::FoodTruck;
use super::params::{ApplicantSearch, NearestSearch, StreetSearch};
use super::service::FoodTruckService;
use crate::error::AppError;

// Query values stay raw strings so malformed numbers surface as validation
// messages instead of extractor rejections.

/// `Query` whose rejection renders as the JSON error body every other failure uses.
pub(crate) struct SearchQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for SearchQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(params))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicantParams {
    name: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreetParams {
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearestParams {
    lat: Option<String>,
    lng: Option<String>,
    limit: Option<String>,
    status: Option<String>,
}

/// Router exposing the three permit searches under `/api/v1`.
pub fn truck_router(service: Arc<FoodTruckService>) -> Router {
    Router::new()
        .route("/api/v1/applicants", get(applicants_handler))
        .route("/api/v1/streets", get(streets_handler))
        .route("/api/v1/nearest", get(nearest_handler))
        .with_state(service)
}

pub(crate) async fn applicants_handler(
    State(service): State<Arc<FoodTruckService>>,
    SearchQuery(params): SearchQuery<ApplicantParams>,
) -> Result<Json<Vec<FoodTruck>>, AppError> {
    let search = ApplicantSearch::new(params.name.as_deref(), params.status.as_deref())?;
    Ok(Json(service.search_by_applicant(&search).await?))
}

pub(crate) async fn streets_handler(
    State(service): State<Arc<FoodTruckService>>,
    SearchQuery(params): SearchQuery<StreetParams>,
) -> Result<Json<Vec<FoodTruck>>, AppError> {
    let search = StreetSearch::new(params.query.as_deref())?;
    Ok(Json(service.search_by_street(&search).await?))
}

pub(crate) async fn nearest_handler(
    State(service): State<Arc<FoodTruckService>>,
    SearchQuery(params): SearchQuery<NearestParams>,
) -> Result<Json<Vec<FoodTruck>>, AppError> {
    let search = NearestSearch::from_raw(
        params.lat.as_deref(),
        params.lng.as_deref(),
        params.limit.as_deref(),
        params.status.as_deref(),
    )?;
    Ok(Json(service.find_nearest(&search).await?))
}
