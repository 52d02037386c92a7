// src/routes/doctor_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    availability::WorkDayRow,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        ApiResponse, AppState, ClinicRow, DoctorDetailsRow, Gender, USER_TYPE_DOCTOR,
    },
    routes::user_routes::{AuthData, LoginRequest, RegisterRequest, login_with_type, register_with_type},
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_doctor))
        .route("/login", post(login_doctor))
        .route("/details", post(add_details))
        .route("/workday", put(put_workday))
        .route("/clinic", post(add_clinic))
        .route("/{doctor_id}", get(get_doctor))
}

/// Onboarding endpoints are doctor-only; the token carries no account type,
/// so the check is one lookup against the user row.
async fn ensure_doctor(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    let user_type: Option<i16> =
        sqlx::query_scalar(r#"SELECT user_type FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::db)?;

    match user_type {
        Some(t) if t == USER_TYPE_DOCTOR => Ok(()),
        Some(_) => Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only doctor accounts can manage doctor profiles".into(),
        )),
        None => Err(ApiError::token_invalid()),
    }
}

/* ============================================================
   Register / login
   ============================================================ */

pub async fn register_doctor(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let data = register_with_type(&state, &req, USER_TYPE_DOCTOR).await?;
    Ok(Json(ApiResponse::success(
        201,
        "Doctor registered successfully",
        data,
    )))
}

pub async fn login_doctor(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let data = login_with_type(&state, &req, USER_TYPE_DOCTOR).await?;
    Ok(Json(ApiResponse::success(200, "Login successful", data)))
}

/* ============================================================
   Public profile details
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    pub name: String,
    pub gender: String,
    pub appointment_fee_cents: i32,
    pub experience_years: i16,
    pub registration_no: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDetailsData {
    pub doctor_id: Uuid,
    pub name: String,
    pub gender: String,
    pub appointment_fee_cents: i32,
    pub experience_years: i16,
    pub registration_no: String,
}

impl From<DoctorDetailsRow> for DoctorDetailsData {
    fn from(row: DoctorDetailsRow) -> Self {
        Self {
            doctor_id: row.doctor_id,
            name: row.name,
            gender: row.gender,
            appointment_fee_cents: row.appointment_fee_cents,
            experience_years: row.experience_years,
            registration_no: row.registration_no,
        }
    }
}

fn validate_details(req: &DetailsRequest) -> Result<Gender, ApiError> {
    validation::validate_name(&req.name)?;
    let gender = Gender::parse(req.gender.trim())
        .ok_or_else(|| ApiError::validation("Gender must be MALE, FEMALE, or OTHER"))?;
    if req.appointment_fee_cents < 0 {
        return Err(ApiError::validation("appointmentFeeCents must not be negative"));
    }
    if !(0..=70).contains(&req.experience_years) {
        return Err(ApiError::validation("experienceYears must be between 0 and 70"));
    }
    if req.registration_no.trim().is_empty() {
        return Err(ApiError::validation("registrationNo is required"));
    }
    Ok(gender)
}

pub async fn add_details(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<DetailsRequest>,
) -> Result<Json<ApiResponse<DoctorDetailsData>>, ApiError> {
    ensure_doctor(&state, auth.user_id).await?;
    let gender = validate_details(&req)?;

    let row: DoctorDetailsRow = sqlx::query_as::<_, DoctorDetailsRow>(
        r#"
        INSERT INTO doctor_details
            (doctor_id, name, gender, appointment_fee_cents, experience_years, registration_no)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (doctor_id) DO UPDATE
        SET name = EXCLUDED.name,
            gender = EXCLUDED.gender,
            appointment_fee_cents = EXCLUDED.appointment_fee_cents,
            experience_years = EXCLUDED.experience_years,
            registration_no = EXCLUDED.registration_no
        RETURNING doctor_id, name, gender, appointment_fee_cents, experience_years, registration_no
        "#,
    )
    .bind(auth.user_id)
    .bind(req.name.trim())
    .bind(gender.as_str())
    .bind(req.appointment_fee_cents)
    .bind(req.experience_years)
    .bind(req.registration_no.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::from_db(e, "Registration number already in use"))?;

    Ok(Json(ApiResponse::success(
        200,
        "Doctor details saved",
        row.into(),
    )))
}

/* ============================================================
   Weekly work schedule
   ============================================================ */

#[derive(Debug, Deserialize, Serialize)]
pub struct WorkDayRequest {
    pub sunday: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

pub async fn put_workday(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<WorkDayRequest>,
) -> Result<Json<ApiResponse<WorkDayRequest>>, ApiError> {
    ensure_doctor(&state, auth.user_id).await?;

    // Exactly one schedule row per doctor; a second PUT replaces the first.
    sqlx::query(
        r#"
        INSERT INTO doctor_work_day
            (doctor_id, sunday, monday, tuesday, wednesday, thursday, friday, saturday)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (doctor_id) DO UPDATE
        SET sunday = EXCLUDED.sunday,
            monday = EXCLUDED.monday,
            tuesday = EXCLUDED.tuesday,
            wednesday = EXCLUDED.wednesday,
            thursday = EXCLUDED.thursday,
            friday = EXCLUDED.friday,
            saturday = EXCLUDED.saturday
        "#,
    )
    .bind(auth.user_id)
    .bind(req.sunday)
    .bind(req.monday)
    .bind(req.tuesday)
    .bind(req.wednesday)
    .bind(req.thursday)
    .bind(req.friday)
    .bind(req.saturday)
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(200, "Work schedule saved", req)))
}

/* ============================================================
   Clinic
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRequest {
    pub clinic_name: String,
    pub sign_board: Option<String>,
    pub contact_no: String,
    pub registration_no: String,
    pub state: String,
    pub district: String,
    pub city: String,
    pub pincode: String,
    pub nearby_location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicData {
    pub clinic_id: Uuid,
    pub clinic_name: String,
    pub sign_board: Option<String>,
    pub contact_no: String,
    pub registration_no: String,
    pub state: String,
    pub district: String,
    pub city: String,
    pub pincode: String,
    pub nearby_location: Option<String>,
}

impl From<ClinicRow> for ClinicData {
    fn from(row: ClinicRow) -> Self {
        Self {
            clinic_id: row.clinic_id,
            clinic_name: row.clinic_name,
            sign_board: row.sign_board,
            contact_no: row.contact_no,
            registration_no: row.registration_no,
            state: row.state,
            district: row.district,
            city: row.city,
            pincode: row.pincode,
            nearby_location: row.nearby_location,
        }
    }
}

fn validate_clinic(req: &ClinicRequest) -> Result<(), ApiError> {
    validation::validate_phone(&req.contact_no)?;
    for (value, field) in [
        (&req.clinic_name, "clinicName"),
        (&req.registration_no, "registrationNo"),
        (&req.state, "state"),
        (&req.district, "district"),
        (&req.city, "city"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::validation(format!("{field} is required")));
        }
    }
    let pin = req.pincode.trim();
    if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("pincode must be exactly 6 digits"));
    }
    Ok(())
}

pub async fn add_clinic(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ClinicRequest>,
) -> Result<Json<ApiResponse<ClinicData>>, ApiError> {
    ensure_doctor(&state, auth.user_id).await?;
    validate_clinic(&req)?;

    let row: ClinicRow = sqlx::query_as::<_, ClinicRow>(
        r#"
        INSERT INTO clinics
            (doctor_id, clinic_name, sign_board, contact_no, registration_no,
             state, district, city, pincode, nearby_location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING clinic_id, doctor_id, clinic_name, sign_board, contact_no,
                  registration_no, state, district, city, pincode, nearby_location
        "#,
    )
    .bind(auth.user_id)
    .bind(req.clinic_name.trim())
    .bind(req.sign_board.as_deref().map(str::trim))
    .bind(req.contact_no.trim())
    .bind(req.registration_no.trim())
    .bind(req.state.trim())
    .bind(req.district.trim())
    .bind(req.city.trim())
    .bind(req.pincode.trim())
    .bind(req.nearby_location.as_deref().map(str::trim))
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::from_db(e, "Clinic already registered"))?;

    Ok(Json(ApiResponse::success(201, "Clinic saved", row.into())))
}

/* ============================================================
   Public profile
   ============================================================ */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileData {
    pub details: DoctorDetailsData,
    pub work_schedule: Option<WorkDayRequest>,
    pub clinic: Option<ClinicData>,
}

pub async fn get_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DoctorProfileData>>, ApiError> {
    let details: DoctorDetailsRow = sqlx::query_as::<_, DoctorDetailsRow>(
        r#"
        SELECT doctor_id, name, gender, appointment_fee_cents, experience_years, registration_no
        FROM doctor_details
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "Doctor not found".into()))?;

    let schedule: Option<WorkDayRow> = sqlx::query_as::<_, WorkDayRow>(
        r#"
        SELECT sunday, monday, tuesday, wednesday, thursday, friday, saturday
        FROM doctor_work_day
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?;

    let clinic: Option<ClinicRow> = sqlx::query_as::<_, ClinicRow>(
        r#"
        SELECT clinic_id, doctor_id, clinic_name, sign_board, contact_no,
               registration_no, state, district, city, pincode, nearby_location
        FROM clinics
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        DoctorProfileData {
            details: details.into(),
            work_schedule: schedule.map(|s| WorkDayRequest {
                sunday: s.sunday,
                monday: s.monday,
                tuesday: s.tuesday,
                wednesday: s.wednesday,
                thursday: s.thursday,
                friday: s.friday,
                saturday: s.saturday,
            }),
            clinic: clinic.map(ClinicData::from),
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_request() -> DetailsRequest {
        DetailsRequest {
            name: "Dr. Anita Rao".into(),
            gender: "FEMALE".into(),
            appointment_fee_cents: 50_000,
            experience_years: 12,
            registration_no: "MH-2013-4471".into(),
        }
    }

    #[test]
    fn details_validation_accepts_sane_input() {
        assert_eq!(validate_details(&details_request()).unwrap(), Gender::Female);
    }

    #[test]
    fn details_validation_rejects_negative_fee() {
        let mut req = details_request();
        req.appointment_fee_cents = -1;
        assert!(validate_details(&req).is_err());
    }

    #[test]
    fn details_validation_rejects_bad_experience() {
        let mut req = details_request();
        req.experience_years = 80;
        assert!(validate_details(&req).is_err());
    }

    #[test]
    fn clinic_validation_checks_pincode() {
        let mut req = ClinicRequest {
            clinic_name: "City Care".into(),
            sign_board: None,
            contact_no: "9876543210".into(),
            registration_no: "CL-991".into(),
            state: "Maharashtra".into(),
            district: "Pune".into(),
            city: "Pune".into(),
            pincode: "411001".into(),
            nearby_location: None,
        };
        assert!(validate_clinic(&req).is_ok());
        req.pincode = "4110".into();
        assert!(validate_clinic(&req).is_err());
    }
}
