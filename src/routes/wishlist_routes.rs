// src/routes/wishlist_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiResponse, AppState, WishlistItemRow},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get", get(get_wishlist_items))
        .route("/add", post(add_to_wishlist))
        .route("/remove", delete(remove_from_wishlist))
}

#[derive(Debug, Deserialize)]
pub struct WishlistItemRequest {
    pub medicine_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WishlistData {
    pub items: Vec<WishlistItemRow>,
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<WishlistItemRequest>,
) -> Result<Json<ApiResponse<WishlistItemRow>>, ApiError> {
    let item: WishlistItemRow = sqlx::query_as::<_, WishlistItemRow>(
        r#"
        INSERT INTO wishlist_items (user_id, medicine_id)
        VALUES ($1, $2)
        RETURNING user_id, medicine_id, created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(req.medicine_id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_foreign_key_violation() {
                return ApiError::NotFound("NOT_FOUND", "Medicine not found".into());
            }
        }
        ApiError::from_db(e, "Item already exists in wishlist")
    })?;

    Ok(Json(ApiResponse::success(201, "Item added to wishlist", item)))
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<WishlistItemRequest>,
) -> Result<Json<ApiResponse<WishlistItemRow>>, ApiError> {
    let item: WishlistItemRow = sqlx::query_as::<_, WishlistItemRow>(
        r#"
        DELETE FROM wishlist_items
        WHERE user_id = $1
          AND medicine_id = $2
        RETURNING user_id, medicine_id, created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(req.medicine_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "Wishlist item not found".into()))?;

    Ok(Json(ApiResponse::success(
        200,
        "Item deleted from wishlist",
        item,
    )))
}

pub async fn get_wishlist_items(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<WishlistData>>, ApiError> {
    let items: Vec<WishlistItemRow> = sqlx::query_as::<_, WishlistItemRow>(
        r#"
        SELECT user_id, medicine_id, created_at
        FROM wishlist_items
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "Items fetched",
        WishlistData { items },
    )))
}
