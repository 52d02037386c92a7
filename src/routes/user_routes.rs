// src/routes/user_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, hash_refresh_token, verify_password},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiResponse, AppState, Gender, USER_TYPE_USER, UserRow},
    sms::generate_otp,
    token::{Identity, TokenPair},
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/* ============================================================
   DTOs
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub gender: String,
    pub date_of_birth: String, // YYYY-MM-DD
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenPairData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
}

impl From<UserRow> for UserPublic {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            gender: row.gender,
            date_of_birth: row.date_of_birth,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserPublic,
    pub tokens: TokenPairData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

/* ============================================================
   Shared register/login flows (also used by doctor onboarding)
   ============================================================ */

pub(crate) fn validate_registration(req: &RegisterRequest) -> Result<(Gender, NaiveDate), ApiError> {
    validation::validate_name(&req.name)?;
    validation::validate_email(&req.email)?;
    validation::validate_phone(&req.phone)?;
    validation::validate_password(&req.password)?;

    let gender = Gender::parse(req.gender.trim())
        .ok_or_else(|| ApiError::validation("Gender must be MALE, FEMALE, or OTHER"))?;
    let dob = NaiveDate::parse_from_str(req.date_of_birth.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation("Date of birth must be YYYY-MM-DD"))?;
    validation::validate_date_of_birth(dob)?;

    Ok((gender, dob))
}

/// Create the user row, issue a token pair and persist the refresh hash.
/// Duplicate phone/email surfaces as 409 from the unique constraints.
pub(crate) async fn register_with_type(
    state: &AppState,
    req: &RegisterRequest,
    user_type: i16,
) -> Result<AuthData, ApiError> {
    let (gender, dob) = validate_registration(req)?;

    let password_hash = hash_password(&req.password).map_err(ApiError::Internal)?;

    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, phone, password_hash, user_type, gender, date_of_birth)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING user_id, name, email, phone, password_hash, user_type, gender, date_of_birth
        "#,
    )
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.phone.trim())
    .bind(&password_hash)
    .bind(user_type)
    .bind(gender.as_str())
    .bind(dob)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::from_db(e, "User already exists"))?;

    let pair = issue_and_store_pair(state, &user).await?;

    Ok(AuthData {
        user: user.into(),
        tokens: pair.into(),
    })
}

pub(crate) async fn login_with_type(
    state: &AppState,
    req: &LoginRequest,
    required_type: i16,
) -> Result<AuthData, ApiError> {
    validation::validate_phone(&req.phone)?;
    if req.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, name, email, phone, password_hash, user_type, gender, date_of_birth
        FROM users
        WHERE phone = $1
        "#,
    )
    .bind(req.phone.trim())
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "User not found".into()))?;

    if user.user_type != required_type {
        return Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Account type not allowed for this login".into(),
        ));
    }

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "INVALID_CREDENTIALS",
            "Phone or password is incorrect".into(),
        ));
    }

    let pair = issue_and_store_pair(state, &user).await?;

    // Login confirmation OTP is best-effort; delivery failure never fails the
    // login itself.
    let otp = generate_otp();
    if let Err(e) = state
        .sms
        .send(
            &format!("Your MediMart login OTP is {otp}"),
            &user.phone,
            state.sms_test_mode,
        )
        .await
    {
        tracing::warn!("otp delivery failed: {e}");
    }

    Ok(AuthData {
        user: user.into(),
        tokens: pair.into(),
    })
}

/// Issue a fresh pair and overwrite the stored refresh hash: one live refresh
/// token per user.
async fn issue_and_store_pair(state: &AppState, user: &UserRow) -> Result<TokenPair, ApiError> {
    let identity = Identity {
        user_id: user.user_id,
        phone: user.phone.clone(),
        email: Some(user.email.clone()),
    };
    let pair = state.tokens.issue_token_pair(&identity)?;

    sqlx::query(
        r#"
        UPDATE users
        SET refresh_token_hash = $1
        WHERE user_id = $2
        "#,
    )
    .bind(hash_refresh_token(&pair.refresh_token))
    .bind(user.user_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(pair)
}

/* ============================================================
   Handlers
   ============================================================ */

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let data = register_with_type(&state, &req, USER_TYPE_USER).await?;
    Ok(Json(ApiResponse::success(
        201,
        "User registered successfully",
        data,
    )))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let data = login_with_type(&state, &req, USER_TYPE_USER).await?;
    Ok(Json(ApiResponse::success(200, "Login successful", data)))
}

#[derive(Debug, sqlx::FromRow)]
struct RefreshTargetRow {
    email: String,
    phone: String,
}

/// Refresh-token rotation. The presented token must pass a signature/expiry
/// check and then match the single hash on file; the swap to the new hash is
/// a compare-and-swap so an already-rotated token can never be replayed.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPairData>>, ApiError> {
    let claims = state.tokens.decode_refresh_token(&req.refresh_token)?;

    let presented_hash = hash_refresh_token(&req.refresh_token);
    let user_id = claims.sub;

    let user: RefreshTargetRow = sqlx::query_as::<_, RefreshTargetRow>(
        r#"
        SELECT email, phone
        FROM users
        WHERE user_id = $1
          AND refresh_token_hash = $2
        "#,
    )
    .bind(user_id)
    .bind(&presented_hash)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(ApiError::stale_refresh_token)?;

    let identity = Identity {
        user_id,
        phone: user.phone,
        email: Some(user.email),
    };
    let pair = state.tokens.issue_token_pair(&identity)?;

    let rotated = sqlx::query(
        r#"
        UPDATE users
        SET refresh_token_hash = $1
        WHERE user_id = $2
          AND refresh_token_hash = $3
        "#,
    )
    .bind(hash_refresh_token(&pair.refresh_token))
    .bind(user_id)
    .bind(&presented_hash)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    // A concurrent rotation won the race; this token is spent.
    if rotated.rows_affected() == 0 {
        return Err(ApiError::stale_refresh_token());
    }

    Ok(Json(ApiResponse::success(
        200,
        "Token pair rotated",
        pair.into(),
    )))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<OkData>>, ApiError> {
    sqlx::query(
        r#"
        UPDATE users
        SET refresh_token_hash = NULL
        WHERE user_id = $1
        "#,
    )
    .bind(auth.user_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "Logged out",
        OkData { ok: true },
    )))
}

#[derive(Debug, Serialize)]
pub struct UsersListData {
    pub users: Vec<UserPublic>,
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UsersListData>>, ApiError> {
    let rows: Vec<UserRow> = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, name, email, phone, password_hash, user_type, gender, date_of_birth
        FROM users
        WHERE user_type = $1
        ORDER BY name ASC
        LIMIT 200
        "#,
    )
    .bind(USER_TYPE_USER)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        UsersListData {
            users: rows.into_iter().map(UserPublic::from).collect(),
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            name: "Rituraj Sharma".into(),
            email: "a@b.com".into(),
            phone: "9999999999".into(),
            password: "Aa1@aaaa".into(),
            gender: "MALE".into(),
            date_of_birth: "2003-05-14".into(),
        }
    }

    #[test]
    fn registration_accepts_valid_fields() {
        let (gender, dob) = validate_registration(&valid_request()).unwrap();
        assert_eq!(gender, Gender::Male);
        assert_eq!(dob, NaiveDate::from_ymd_opt(2003, 5, 14).unwrap());
    }

    #[test]
    fn registration_rejects_bad_gender() {
        let mut req = valid_request();
        req.gender = "male".into();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn registration_rejects_bad_date() {
        let mut req = valid_request();
        req.date_of_birth = "14-05-2003".into();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn registration_rejects_weak_password() {
        let mut req = valid_request();
        req.password = "password".into();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn register_request_uses_camel_case_wire_names() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Rituraj Sharma",
            "email": "a@b.com",
            "phone": "9999999999",
            "password": "Aa1@aaaa",
            "gender": "MALE",
            "dateOfBirth": "2003-05-14"
        }))
        .unwrap();
        assert_eq!(req.date_of_birth, "2003-05-14");
    }
}
