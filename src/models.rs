use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sms::SmsGateway;
use crate::token::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub tokens: TokenKeys,
    pub sms: Arc<dyn SmsGateway>,
    pub sms_test_mode: bool,
}

/* -------------------------
   Response envelope
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseStatus {
    Success,
    Pending,
    Failed,
}

/// Success-path envelope: {status, statusCode, message, data, success}.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub data: T,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status: ResponseStatus, status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            status_code,
            message: message.into(),
            data,
            success: status == ResponseStatus::Success,
        }
    }

    pub fn success(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self::new(ResponseStatus::Success, status_code, message, data)
    }
}

/* -------------------------
   Domain enums

   Stored as TEXT; bound with as_str() and parsed back on read so a bad row
   surfaces as a decode error instead of a panic.
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            "OTHER" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    Online,
    Offline,
}

impl AppointmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Online => "ONLINE",
            AppointmentType::Offline => "OFFLINE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ONLINE" => Some(AppointmentType::Online),
            "OFFLINE" => Some(AppointmentType::Offline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(AppointmentStatus::Pending),
            "CONFIRMED" => Some(AppointmentStatus::Confirmed),
            "CANCELLED" => Some(AppointmentStatus::Cancelled),
            "COMPLETED" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

/// users.user_type codes.
pub const USER_TYPE_USER: i16 = 0;
pub const USER_TYPE_DOCTOR: i16 = 1;

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub user_type: i16,
    pub gender: String,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
pub struct DoctorDetailsRow {
    pub doctor_id: Uuid,
    pub name: String,
    pub gender: String,
    pub appointment_fee_cents: i32,
    pub experience_years: i16,
    pub registration_no: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ClinicRow {
    pub clinic_id: Uuid,
    pub doctor_id: Uuid,
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

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MedicineRow {
    pub medicine_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub expiry_date: Option<NaiveDate>,
    pub prescription_required: bool,
    pub stock_quantity: i32,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub manufacturer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItemRow {
    pub user_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistItemRow {
    pub user_id: Uuid,
    pub medicine_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub user_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub patient_name: String,
    pub patient_age: i16,
    pub patient_gender: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_their_wire_form() {
        for g in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(Gender::parse(g.as_str()), Some(g));
        }
        for t in [AppointmentType::Online, AppointmentType::Offline] {
            assert_eq!(AppointmentType::parse(t.as_str()), Some(t));
        }
        for s in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(AppointmentStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(Gender::parse("male"), None);
        assert_eq!(AppointmentType::parse("VIDEO"), None);
    }

    #[test]
    fn envelope_success_flag_tracks_status() {
        let ok = ApiResponse::success(200, "fetched", 1);
        assert!(ok.success);
        let pending = ApiResponse::new(ResponseStatus::Pending, 202, "queued", 1);
        assert!(!pending.success);
    }

    #[test]
    fn envelope_serializes_wire_shape() {
        let json = serde_json::to_value(ApiResponse::success(201, "created", 7)).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["message"], "created");
        assert_eq!(json["data"], 7);
        assert_eq!(json["success"], true);
    }
}
