//! Store service: registered marts and distance ranking.
//!
//! Parties name their store by string (`mart_name`); this module resolves
//! those names to coordinates so party and store listings can be ordered by
//! distance from the caller.

use std::collections::HashMap;

use sqlx::PgPool;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("store name is required")]
    EmptyName,
    #[error("store already exists: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` when either value is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, StoreError> {
        let valid = lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(StoreError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Build from optional query parameters. Both must be present to yield an origin.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` when present values are out of range.
    pub fn from_query(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Self>, StoreError> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }

    /// Great-circle (haversine) distance in kilometers.
    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Round a distance to one decimal place for display.
#[must_use]
pub fn round_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl StoreRow {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lng: self.lng }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStore {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Attach distances and order nearest first. Without an origin every
/// distance is zero and the input order is kept.
#[must_use]
pub fn rank_by_distance(stores: Vec<StoreRow>, origin: Option<Coordinates>) -> Vec<NearbyStore> {
    let mut ranked: Vec<NearbyStore> = stores
        .into_iter()
        .map(|store| {
            let distance_km = origin.map_or(0.0, |o| round_tenth(o.distance_km(store.coordinates())));
            NearbyStore { id: store.id, name: store.name, address: store.address, distance_km }
        })
        .collect();

    if origin.is_some() {
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    }
    ranked
}

/// List all stores by name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<StoreRow>, StoreError> {
    let rows = sqlx::query_as::<_, StoreRow>("SELECT id, name, address, lat, lng FROM stores ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Store coordinates keyed by store name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn coordinates_by_name(pool: &PgPool) -> Result<HashMap<String, Coordinates>, StoreError> {
    Ok(list_stores(pool)
        .await?
        .into_iter()
        .map(|store| {
            let coords = store.coordinates();
            (store.name, coords)
        })
        .collect())
}

/// List stores ranked by distance from `origin`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn nearby_stores(pool: &PgPool, origin: Option<Coordinates>) -> Result<Vec<NearbyStore>, StoreError> {
    let stores = list_stores(pool).await?;
    Ok(rank_by_distance(stores, origin))
}

/// Register a store.
///
/// # Errors
///
/// Returns `EmptyName`, `InvalidCoordinates`, or `Duplicate` on bad input.
pub async fn create_store(pool: &PgPool, store: &NewStore) -> Result<StoreRow, StoreError> {
    let name = store.name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    let coords = Coordinates::new(store.lat, store.lng)?;

    let row = sqlx::query_as::<_, StoreRow>(
        r"INSERT INTO stores (name, address, lat, lng)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (name) DO NOTHING
          RETURNING id, name, address, lat, lng",
    )
    .bind(name)
    .bind(store.address.trim())
    .bind(coords.lat)
    .bind(coords.lng)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::Duplicate(name.to_owned()))?;

    tracing::info!(store_id = row.id, name = %row.name, "store registered");
    Ok(row)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
