// src/routes/cart_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiResponse, AppState, CartItemRow},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get", get(get_cart_items))
        .route("/add", post(add_to_cart))
        .route("/update", put(update_cart_item))
        .route("/remove", delete(remove_from_cart))
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub medicine_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CartRemoveRequest {
    pub medicine_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CartData {
    pub items: Vec<CartItemRow>,
}

fn validate_quantity(quantity: i32) -> Result<(), ApiError> {
    if quantity <= 0 {
        return Err(ApiError::validation("quantity must be greater than zero"));
    }
    if quantity > 100 {
        return Err(ApiError::validation("quantity must not exceed 100"));
    }
    Ok(())
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<ApiResponse<CartItemRow>>, ApiError> {
    validate_quantity(req.quantity)?;

    // The (user_id, medicine_id) unique constraint turns a duplicate add into
    // a 409; no pre-read needed.
    let item: CartItemRow = sqlx::query_as::<_, CartItemRow>(
        r#"
        INSERT INTO cart_items (user_id, medicine_id, quantity)
        VALUES ($1, $2, $3)
        RETURNING user_id, medicine_id, quantity, created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(req.medicine_id)
    .bind(req.quantity)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_foreign_key_violation() {
                return ApiError::NotFound("NOT_FOUND", "Medicine not found".into());
            }
        }
        ApiError::from_db(e, "Item already exists in cart, try updating it")
    })?;

    Ok(Json(ApiResponse::success(200, "Item added to cart", item)))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<ApiResponse<CartItemRow>>, ApiError> {
    validate_quantity(req.quantity)?;

    let item: CartItemRow = sqlx::query_as::<_, CartItemRow>(
        r#"
        UPDATE cart_items
        SET quantity = $1
        WHERE user_id = $2
          AND medicine_id = $3
        RETURNING user_id, medicine_id, quantity, created_at
        "#,
    )
    .bind(req.quantity)
    .bind(auth.user_id)
    .bind(req.medicine_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "Cart item not found".into()))?;

    Ok(Json(ApiResponse::success(200, "Cart updated", item)))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CartRemoveRequest>,
) -> Result<Json<ApiResponse<CartItemRow>>, ApiError> {
    let item: CartItemRow = sqlx::query_as::<_, CartItemRow>(
        r#"
        DELETE FROM cart_items
        WHERE user_id = $1
          AND medicine_id = $2
        RETURNING user_id, medicine_id, quantity, created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(req.medicine_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "Cart item not found".into()))?;

    Ok(Json(ApiResponse::success(200, "Cart item deleted", item)))
}

pub async fn get_cart_items(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<CartData>>, ApiError> {
    let items: Vec<CartItemRow> = sqlx::query_as::<_, CartItemRow>(
        r#"
        SELECT user_id, medicine_id, quantity, created_at
        FROM cart_items
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(200, "Data fetched", CartData { items })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(101).is_err());
    }
}
