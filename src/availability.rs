use chrono::{Datelike, NaiveDate, Weekday};
use uuid::Uuid;

use crate::error::ApiError;

/// One row per doctor: seven independent weekday flags.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct WorkDayRow {
    pub sunday: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
}

impl WorkDayRow {
    pub fn works_on(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Sun => self.sunday,
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
        }
    }
}

/// Does the doctor accept appointments on the weekday `date` falls on?
/// Dates are calendar dates (UTC), so the answer is stable for a fixed
/// schedule. A doctor with no schedule row is simply not available.
pub async fn is_doctor_available(
    db: &sqlx::PgPool,
    doctor_id: Uuid,
    date: NaiveDate,
) -> Result<bool, ApiError> {
    let schedule: Option<WorkDayRow> = sqlx::query_as::<_, WorkDayRow>(
        r#"
        SELECT sunday, monday, tuesday, wednesday, thursday, friday, saturday
        FROM doctor_work_day
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(db)
    .await
    .map_err(ApiError::db)?;

    Ok(schedule.map(|s| s.works_on(date.weekday())).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekdays_only() -> WorkDayRow {
        WorkDayRow {
            sunday: false,
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
        }
    }

    #[test]
    fn schedule_flag_follows_weekday() {
        let row = weekdays_only();
        assert!(!row.works_on(Weekday::Sun));
        assert!(row.works_on(Weekday::Mon));
        assert!(row.works_on(Weekday::Fri));
        assert!(!row.works_on(Weekday::Sat));
    }

    #[test]
    fn lookup_is_pure_for_a_fixed_schedule() {
        let row = weekdays_only();
        // 2026-09-07 is a Monday.
        let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let first = row.works_on(date.weekday());
        let second = row.works_on(date.weekday());
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn gregorian_day_of_week_mapping() {
        // 2025-01-05 was a Sunday; successive days walk the week.
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(sunday.succ_opt().unwrap().weekday(), Weekday::Mon);
    }
}
