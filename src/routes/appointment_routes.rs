// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    availability::is_doctor_available,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        ApiResponse, AppState, AppointmentRow, AppointmentStatus, AppointmentType, ClinicRow,
        DoctorDetailsRow, Gender, ResponseStatus,
    },
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/{appointment_id}/confirm", post(confirm_appointment))
        .route("/{appointment_id}/cancel", post(cancel_appointment))
        .route("/{appointment_id}/complete", post(complete_appointment))
}

/* ============================================================
   Create
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_age: i16,
    pub patient_gender: String,
    pub patient_phone: String,
    pub appointment_date: String, // YYYY-MM-DD
    pub appointment_type: String,
    pub clinic_id: Uuid,
}

#[derive(Debug)]
pub struct ValidatedAppointment {
    pub gender: Gender,
    pub appointment_type: AppointmentType,
    pub date: NaiveDate,
}

/// Booking window: today through seven days out, inclusive on both ends,
/// compared at day granularity.
pub fn within_booking_window(date: NaiveDate, today: NaiveDate) -> bool {
    let days_diff = (date - today).num_days();
    (0..=7).contains(&days_diff)
}

fn validate_create(
    req: &CreateAppointmentRequest,
    today: NaiveDate,
) -> Result<ValidatedAppointment, ApiError> {
    validation::validate_name(&req.patient_name)?;
    validation::validate_phone(&req.patient_phone)?;
    if !(1..=150).contains(&req.patient_age) {
        return Err(ApiError::validation("patientAge must be between 1 and 150"));
    }
    let gender = Gender::parse(req.patient_gender.trim())
        .ok_or_else(|| ApiError::validation("Invalid gender value"))?;
    let appointment_type = AppointmentType::parse(req.appointment_type.trim())
        .ok_or_else(|| ApiError::validation("Appointments are only accepted in ONLINE and OFFLINE mode"))?;
    let date = NaiveDate::parse_from_str(req.appointment_date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation("appointmentDate must be YYYY-MM-DD"))?;

    if !within_booking_window(date, today) {
        return Err(ApiError::validation(
            "Date must be within the next 7 days and not in the past",
        ));
    }

    Ok(ValidatedAppointment {
        gender,
        appointment_type,
        date,
    })
}

/// Denormalized receipt: patient fields plus the doctor's and clinic's public
/// fields, matching what the booking confirmation screen renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentReceipt {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
    pub appointment_date: NaiveDate,
    pub appointment_type: String,

    pub patient_name: String,
    pub patient_age: i16,
    pub patient_gender: String,

    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub doctor_gender: Option<String>,
    pub doctor_fee_cents: Option<i32>,
    pub doctor_experience_years: Option<i16>,

    pub clinic_id: Option<Uuid>,
    pub clinic_name: Option<String>,
    pub clinic_sign_board: Option<String>,
    pub clinic_contact_no: Option<String>,
    pub clinic_registration_no: Option<String>,
    pub clinic_state: Option<String>,
    pub clinic_district: Option<String>,
    pub clinic_city: Option<String>,
    pub clinic_pincode: Option<String>,
    pub clinic_nearby: Option<String>,
}

pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<Json<ApiResponse<AppointmentReceipt>>, ApiError> {
    let today = Utc::now().date_naive();
    let validated = validate_create(&req, today)?;

    if !is_doctor_available(&state.db, req.doctor_id, validated.date).await? {
        return Err(ApiError::validation("The doctor doesn't work on this day"));
    }

    let appointment: AppointmentRow = sqlx::query_as::<_, AppointmentRow>(
        r#"
        INSERT INTO appointments
            (user_id, doctor_id, clinic_id, patient_name, patient_age, patient_gender,
             patient_phone, appointment_date, appointment_type, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING appointment_id, user_id, doctor_id, clinic_id, patient_name, patient_age,
                  patient_gender, patient_phone, appointment_date, appointment_type, status,
                  created_at
        "#,
    )
    .bind(auth.user_id)
    .bind(req.doctor_id)
    .bind(req.clinic_id)
    .bind(req.patient_name.trim())
    .bind(req.patient_age)
    .bind(validated.gender.as_str())
    .bind(req.patient_phone.trim())
    .bind(validated.date)
    .bind(validated.appointment_type.as_str())
    .bind(AppointmentStatus::Pending.as_str())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_foreign_key_violation() {
                return ApiError::validation("Unknown doctor or clinic");
            }
        }
        ApiError::db(e)
    })?;

    // Enrichment is best-effort: the appointment row above is already
    // committed, so a failed lookup degrades the receipt instead of the
    // booking.
    let doctor: Option<DoctorDetailsRow> = sqlx::query_as::<_, DoctorDetailsRow>(
        r#"
        SELECT doctor_id, name, gender, appointment_fee_cents, experience_years, registration_no
        FROM doctor_details
        WHERE doctor_id = $1
        "#,
    )
    .bind(appointment.doctor_id)
    .fetch_optional(&state.db)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("receipt doctor lookup failed: {e}");
        None
    });

    let clinic: Option<ClinicRow> = match appointment.clinic_id {
        Some(clinic_id) => sqlx::query_as::<_, ClinicRow>(
            r#"
            SELECT clinic_id, doctor_id, clinic_name, sign_board, contact_no,
                   registration_no, state, district, city, pincode, nearby_location
            FROM clinics
            WHERE clinic_id = $1
            "#,
        )
        .bind(clinic_id)
        .fetch_optional(&state.db)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("receipt clinic lookup failed: {e}");
            None
        }),
        None => None,
    };

    let receipt = AppointmentReceipt {
        appointment_id: appointment.appointment_id,
        status: AppointmentStatus::Pending,
        appointment_date: appointment.appointment_date,
        appointment_type: appointment.appointment_type,

        patient_name: appointment.patient_name,
        patient_age: appointment.patient_age,
        patient_gender: appointment.patient_gender,

        doctor_id: appointment.doctor_id,
        doctor_name: doctor.as_ref().map(|d| d.name.clone()),
        doctor_gender: doctor.as_ref().map(|d| d.gender.clone()),
        doctor_fee_cents: doctor.as_ref().map(|d| d.appointment_fee_cents),
        doctor_experience_years: doctor.as_ref().map(|d| d.experience_years),

        clinic_id: appointment.clinic_id,
        clinic_name: clinic.as_ref().map(|c| c.clinic_name.clone()),
        clinic_sign_board: clinic.as_ref().and_then(|c| c.sign_board.clone()),
        clinic_contact_no: clinic.as_ref().map(|c| c.contact_no.clone()),
        clinic_registration_no: clinic.as_ref().map(|c| c.registration_no.clone()),
        clinic_state: clinic.as_ref().map(|c| c.state.clone()),
        clinic_district: clinic.as_ref().map(|c| c.district.clone()),
        clinic_city: clinic.as_ref().map(|c| c.city.clone()),
        clinic_pincode: clinic.as_ref().map(|c| c.pincode.clone()),
        clinic_nearby: clinic.as_ref().and_then(|c| c.nearby_location.clone()),
    };

    Ok(Json(ApiResponse::new(
        ResponseStatus::Pending,
        201,
        "Appointment created, awaiting doctor confirmation",
        receipt,
    )))
}

/* ============================================================
   Status transitions

   Confirm and complete are doctor actions; cancel may come from either
   party. Everything else is an illegal transition.
   ============================================================ */

pub fn transition_allowed(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionData {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Actor {
    DoctorOnly,
    Either,
}

async fn apply_transition(
    state: &AppState,
    auth: &AuthContext,
    appointment_id: Uuid,
    to: AppointmentStatus,
    actor: Actor,
) -> Result<TransitionData, ApiError> {
    let appointment: AppointmentRow = sqlx::query_as::<_, AppointmentRow>(
        r#"
        SELECT appointment_id, user_id, doctor_id, clinic_id, patient_name, patient_age,
               patient_gender, patient_phone, appointment_date, appointment_type, status,
               created_at
        FROM appointments
        WHERE appointment_id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "Appointment not found".into()))?;

    let allowed_party = match actor {
        Actor::DoctorOnly => auth.user_id == appointment.doctor_id,
        Actor::Either => {
            auth.user_id == appointment.doctor_id || auth.user_id == appointment.user_id
        }
    };
    if !allowed_party {
        return Err(ApiError::Forbidden(
            "FORBIDDEN",
            "You are not a party to this appointment".into(),
        ));
    }

    let from = AppointmentStatus::parse(&appointment.status)
        .ok_or_else(|| ApiError::Internal("Unknown appointment status".into()))?;
    if !transition_allowed(from, to) {
        return Err(ApiError::BadRequest(
            "INVALID_TRANSITION",
            format!("Cannot move appointment from {} to {}", from.as_str(), to.as_str()),
        ));
    }

    // Guard against a racing transition with a status-qualified update.
    let updated = sqlx::query(
        r#"
        UPDATE appointments
        SET status = $1
        WHERE appointment_id = $2
          AND status = $3
        "#,
    )
    .bind(to.as_str())
    .bind(appointment_id)
    .bind(from.as_str())
    .execute(&state.db)
    .await
    .map_err(ApiError::db)?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "CONFLICT",
            "Appointment status changed concurrently, reload and retry".into(),
        ));
    }

    Ok(TransitionData {
        appointment_id,
        status: to,
    })
}

pub async fn confirm_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransitionData>>, ApiError> {
    let data = apply_transition(
        &state,
        &auth,
        appointment_id,
        AppointmentStatus::Confirmed,
        Actor::DoctorOnly,
    )
    .await?;
    Ok(Json(ApiResponse::success(200, "Appointment confirmed", data)))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransitionData>>, ApiError> {
    let data = apply_transition(
        &state,
        &auth,
        appointment_id,
        AppointmentStatus::Cancelled,
        Actor::Either,
    )
    .await?;
    Ok(Json(ApiResponse::success(200, "Appointment cancelled", data)))
}

pub async fn complete_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransitionData>>, ApiError> {
    let data = apply_transition(
        &state,
        &auth,
        appointment_id,
        AppointmentStatus::Completed,
        Actor::DoctorOnly,
    )
    .await?;
    Ok(Json(ApiResponse::success(200, "Appointment completed", data)))
}

/* ============================================================
   List
   ============================================================ */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListItem {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub patient_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_type: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsListData {
    pub appointments: Vec<AppointmentListItem>,
}

/// All appointments the caller is a party to, either as the booking user or
/// as the doctor.
pub async fn list_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<AppointmentsListData>>, ApiError> {
    let rows: Vec<AppointmentRow> = sqlx::query_as::<_, AppointmentRow>(
        r#"
        SELECT appointment_id, user_id, doctor_id, clinic_id, patient_name, patient_age,
               patient_gender, patient_phone, appointment_date, appointment_type, status,
               created_at
        FROM appointments
        WHERE user_id = $1 OR doctor_id = $1
        ORDER BY appointment_date ASC, created_at ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(ApiResponse::success(
        200,
        "OK",
        AppointmentsListData {
            appointments: rows
                .into_iter()
                .map(|r| AppointmentListItem {
                    appointment_id: r.appointment_id,
                    doctor_id: r.doctor_id,
                    clinic_id: r.clinic_id,
                    patient_name: r.patient_name,
                    appointment_date: r.appointment_date,
                    appointment_type: r.appointment_type,
                    status: r.status,
                })
                .collect(),
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::WorkDayRow;
    use chrono::Datelike;

    fn request(date: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            doctor_id: Uuid::new_v4(),
            patient_name: "Asha Verma".into(),
            patient_age: 34,
            patient_gender: "FEMALE".into(),
            patient_phone: "9876543210".into(),
            appointment_date: date.into(),
            appointment_type: "OFFLINE".into(),
            clinic_id: Uuid::new_v4(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn booking_window_is_inclusive_on_both_ends() {
        let t = today();
        assert!(!within_booking_window(t - chrono::Duration::days(1), t)); // daysDiff = -1
        assert!(within_booking_window(t, t)); // daysDiff = 0
        assert!(within_booking_window(t + chrono::Duration::days(7), t)); // daysDiff = 7
        assert!(!within_booking_window(t + chrono::Duration::days(8), t)); // daysDiff = 8
    }

    #[test]
    fn create_validation_enforces_window() {
        assert!(validate_create(&request("2026-03-17"), today()).is_ok());
        assert!(validate_create(&request("2026-03-18"), today()).is_err());
        assert!(validate_create(&request("2026-03-09"), today()).is_err());
    }

    #[test]
    fn create_validation_checks_enums() {
        let mut req = request("2026-03-11");
        req.patient_gender = "F".into();
        assert!(validate_create(&req, today()).is_err());

        let mut req = request("2026-03-11");
        req.appointment_type = "VIDEO".into();
        assert!(validate_create(&req, today()).is_err());
    }

    #[test]
    fn create_validation_checks_age_and_phone() {
        let mut req = request("2026-03-11");
        req.patient_age = 0;
        assert!(validate_create(&req, today()).is_err());

        let mut req = request("2026-03-11");
        req.patient_phone = "12345".into();
        assert!(validate_create(&req, today()).is_err());
    }

    #[test]
    fn doctor_off_on_monday_blocks_a_monday_booking() {
        let schedule = WorkDayRow {
            sunday: true,
            monday: false,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
        };
        // 2026-03-16 is a Monday within the window of 2026-03-10.
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        assert_eq!(date.weekday(), chrono::Weekday::Mon);
        assert!(within_booking_window(date, today()));
        assert!(!schedule.works_on(date.weekday()));
    }

    #[test]
    fn transition_table() {
        use AppointmentStatus::*;
        assert!(transition_allowed(Pending, Confirmed));
        assert!(transition_allowed(Pending, Cancelled));
        assert!(transition_allowed(Confirmed, Cancelled));
        assert!(transition_allowed(Confirmed, Completed));

        assert!(!transition_allowed(Pending, Completed));
        assert!(!transition_allowed(Confirmed, Pending));
        assert!(!transition_allowed(Cancelled, Confirmed));
        assert!(!transition_allowed(Completed, Cancelled));
        assert!(!transition_allowed(Cancelled, Cancelled));
    }
}
