//! Geofence storage and point-in-polygon lookup (PostGIS).

use sqlx::{FromRow, PgPool};

/// One geofence matched by a point lookup. `(geo_id, mtfcc)` keys the join
/// back onto districts.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceHit {
    pub geo_id: String,
    pub mtfcc: String,
    pub label: Option<String>,
}

/// Geofences whose polygon contains the given point.
pub async fn find_containing(
    pool: &PgPool,
    lat: f64,
    lng: f64,
) -> Result<Vec<GeofenceHit>, sqlx::Error> {
    sqlx::query_as(
        "SELECT geo_id, mtfcc, label
           FROM geofences
          WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))",
    )
    .bind(lng)
    .bind(lat)
    .fetch_all(pool)
    .await
}

/// Inserts or replaces one geofence polygon from WKT. Used by the geofence
/// import tooling and tests.
pub async fn upsert_geofence(
    pool: &PgPool,
    geo_id: &str,
    mtfcc: &str,
    label: Option<&str>,
    wkt: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO geofences (geo_id, mtfcc, label, geom)
         VALUES ($1, $2, $3, ST_SetSRID(ST_GeomFromText($4), 4326))
         ON CONFLICT (geo_id, mtfcc) DO UPDATE SET
           label = excluded.label,
           geom = excluded.geom",
    )
    .bind(geo_id)
    .bind(mtfcc)
    .bind(label)
    .bind(wkt)
    .execute(pool)
    .await?;
    Ok(())
}
