// src/routes/medicine_routes.rs

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{ApiResponse, AppState, MedicineRow},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_medicines))
        .route("/by-brand", get(get_medicines_by_brand))
        .route("/by-category", get(get_medicines_by_category))
        .route("/categories", get(all_categories))
        .route("/brands", get(all_brands))
        .route("/manufacturers", get(all_manufacturers))
        .route("/seed", post(seed_medicines))
}

/* ============================================================
   DTOs
   ============================================================ */

/// Catalog listing shape; stock and prescription flags included, internal
/// supplier ids left out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePublic {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub expiry: Option<NaiveDate>,
    pub is_prescription_required: bool,
    pub stock: i32,
}

impl From<MedicineRow> for MedicinePublic {
    fn from(row: MedicineRow) -> Self {
        Self {
            medicine_id: row.medicine_id,
            medicine_name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            expiry: row.expiry_date,
            is_prescription_required: row.prescription_required,
            stock: row.stock_quantity,
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MedicinesData {
    pub medicines: Vec<MedicinePublic>,
}

const MEDICINE_COLUMNS: &str = "medicine_id, name, description, price_cents, expiry_date, \
                                prescription_required, stock_quantity, brand_id, category_id, \
                                manufacturer_id";

/* ============================================================
   Handlers
   ============================================================ */

pub async fn get_all_medicines(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MedicinesData>>, ApiError> {
    let rows: Vec<MedicineRow> = sqlx::query_as::<_, MedicineRow>(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY name ASC"
    ))
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        MedicinesData {
            medicines: rows.into_iter().map(MedicinePublic::from).collect(),
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    pub brand_id: Option<Uuid>,
}

pub async fn get_medicines_by_brand(
    State(state): State<AppState>,
    Query(q): Query<BrandQuery>,
) -> Result<Json<ApiResponse<MedicinesData>>, ApiError> {
    let brand_id = q
        .brand_id
        .ok_or_else(|| ApiError::validation("brand_id query parameter is required"))?;

    let rows: Vec<MedicineRow> = sqlx::query_as::<_, MedicineRow>(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE brand_id = $1 ORDER BY name ASC"
    ))
    .bind(brand_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        MedicinesData {
            medicines: rows.into_iter().map(MedicinePublic::from).collect(),
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category_id: Option<Uuid>,
}

pub async fn get_medicines_by_category(
    State(state): State<AppState>,
    Query(q): Query<CategoryQuery>,
) -> Result<Json<ApiResponse<MedicinesData>>, ApiError> {
    let category_id = q
        .category_id
        .ok_or_else(|| ApiError::validation("category_id query parameter is required"))?;

    let rows: Vec<MedicineRow> = sqlx::query_as::<_, MedicineRow>(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE category_id = $1 ORDER BY name ASC"
    ))
    .bind(category_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        MedicinesData {
            medicines: rows.into_iter().map(MedicinePublic::from).collect(),
        },
    )))
}

#[derive(Debug, Serialize)]
pub struct CatalogData {
    pub entries: Vec<CatalogEntry>,
}

async fn list_catalog_table(
    state: &AppState,
    sql: &str,
) -> Result<Json<ApiResponse<CatalogData>>, ApiError> {
    let entries: Vec<CatalogEntry> = sqlx::query_as::<_, CatalogEntry>(sql)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(200, "OK", CatalogData { entries })))
}

pub async fn all_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogData>>, ApiError> {
    list_catalog_table(
        &state,
        "SELECT category_id AS id, name, description FROM categories ORDER BY name ASC",
    )
    .await
}

pub async fn all_brands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogData>>, ApiError> {
    list_catalog_table(
        &state,
        "SELECT brand_id AS id, name, description FROM brands ORDER BY name ASC",
    )
    .await
}

pub async fn all_manufacturers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogData>>, ApiError> {
    list_catalog_table(
        &state,
        "SELECT manufacturer_id AS id, name, description FROM manufacturers ORDER BY name ASC",
    )
    .await
}

/* ============================================================
   Dev seeding
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedMedicine {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub expiry_date: Option<NaiveDate>,
    pub prescription_required: Option<bool>,
    pub stock_quantity: Option<i32>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub manufacturer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SeedData {
    pub inserted: usize,
}

/// Bulk insert for development fixtures. All rows go in one transaction so a
/// bad entry rolls back the whole batch.
pub async fn seed_medicines(
    State(state): State<AppState>,
    Json(items): Json<Vec<SeedMedicine>>,
) -> Result<Json<ApiResponse<SeedData>>, ApiError> {
    if items.is_empty() {
        return Err(ApiError::validation("Provide at least one medicine"));
    }

    let mut tx = state.db.begin().await.map_err(ApiError::db)?;

    for item in &items {
        if item.name.trim().is_empty() {
            return Err(ApiError::validation("Medicine name is required"));
        }
        if item.price_cents < 0 {
            return Err(ApiError::validation("priceCents must not be negative"));
        }
        sqlx::query(
            r#"
            INSERT INTO medicines
                (name, description, price_cents, expiry_date, prescription_required,
                 stock_quantity, brand_id, category_id, manufacturer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.name.trim())
        .bind(item.description.as_deref())
        .bind(item.price_cents)
        .bind(item.expiry_date)
        .bind(item.prescription_required.unwrap_or(false))
        .bind(item.stock_quantity.unwrap_or(0))
        .bind(item.brand_id)
        .bind(item.category_id)
        .bind(item.manufacturer_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::db)?;
    }

    tx.commit().await.map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        201,
        "Medicines created successfully",
        SeedData {
            inserted: items.len(),
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_shape_drops_supplier_ids() {
        let row = MedicineRow {
            medicine_id: Uuid::new_v4(),
            name: "Paracetamol 500mg".into(),
            description: None,
            price_cents: 2500,
            expiry_date: None,
            prescription_required: false,
            stock_quantity: 40,
            brand_id: Some(Uuid::new_v4()),
            category_id: None,
            manufacturer_id: None,
        };
        let json = serde_json::to_value(MedicinePublic::from(row)).unwrap();
        assert_eq!(json["medicineName"], "Paracetamol 500mg");
        assert_eq!(json["stock"], 40);
        assert_eq!(json["isPrescriptionRequired"], false);
        assert!(json.get("brandId").is_none());
    }
}
