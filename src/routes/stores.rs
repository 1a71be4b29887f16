//! Store directory and map search routes.

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routes::extract::{Json, Query};
use crate::routes::response::{ApiError, ApiResult, ok};
use crate::services::places::PlacesError;
use crate::services::store::{self, Coordinates, NearbyStore, NewStore, StoreRow};
use crate::state::AppState;

/// Optional caller location shared by the store and party listings.
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl LocationQuery {
    pub(crate) fn origin(&self) -> Result<Option<Coordinates>, ApiError> {
        Ok(Coordinates::from_query(self.lat, self.lng)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub distance: f64,
}

impl From<NearbyStore> for StoreResponse {
    fn from(s: NearbyStore) -> Self {
        Self { store_id: s.id, name: s.name, address: s.address, distance: s.distance_km }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStoreResponse {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<StoreRow> for CreatedStoreResponse {
    fn from(s: StoreRow) -> Self {
        Self { store_id: s.id, name: s.name, address: s.address, lat: s.lat, lng: s.lng }
    }
}

#[derive(Deserialize)]
pub struct CreateStoreBody {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub places: Value,
}

/// `GET /api/v1/stores/nearby?lat&lng`
pub async fn nearby(State(state): State<AppState>, Query(query): Query<LocationQuery>) -> ApiResult<Vec<StoreResponse>> {
    let origin = query.origin()?;
    let stores = store::nearby_stores(&state.pool, origin).await?;
    ok(stores.into_iter().map(Into::into).collect())
}

/// `POST /api/v1/stores`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateStoreBody>,
) -> ApiResult<CreatedStoreResponse> {
    let new = NewStore { name: body.name, address: body.address, lat: body.lat, lng: body.lng };
    ok(store::create_store(&state.pool, &new).await?.into())
}

/// `GET /api/v1/map/search?keyword=`: proxy to the configured place provider.
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<SearchResponse> {
    let keyword = query.keyword.trim();
    if keyword.is_empty() {
        return Err(PlacesError::EmptyKeyword.into());
    }
    let Some(places) = state.places.as_ref() else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "place search is not configured"));
    };
    let places = places.search(keyword).await?;
    ok(SearchResponse { places })
}
