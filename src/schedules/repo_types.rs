use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use crate::store::Record;

time::serde::format_description!(
    minute_precision,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]"
);

/// One study session in a user's calendar. Group sessions are copied into
/// every member's calendar with the same `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
    pub title: String,
    #[serde(with = "minute_precision")]
    pub start_time: PrimitiveDateTime,
    #[serde(with = "minute_precision")]
    pub end_time: PrimitiveDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StudySession {
    pub fn new(
        user_id: Uuid,
        group_id: Option<Uuid>,
        title: &str,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            group_id,
            title: title.trim().to_string(),
            start_time,
            end_time,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Parse `YYYY-MM-DDTHH:MM`.
pub fn parse_slot(value: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        value.trim(),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    )
    .ok()
}

impl Record for StudySession {
    const ENTITY: &'static str = "Study session";
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_minute_precision_only() {
        assert_eq!(parse_slot("2025-03-01T09:30"), Some(datetime!(2025-03-01 09:30)));
        assert_eq!(parse_slot(" 2025-03-01T09:30 "), Some(datetime!(2025-03-01 09:30)));
        assert!(parse_slot("2025-03-01 09:30").is_none());
        assert!(parse_slot("2025-02-30T09:30").is_none());
        assert!(parse_slot("03/01/2025 09:30AM").is_none());
    }

    #[test]
    fn times_serialize_in_input_format() {
        let s = StudySession::new(
            Uuid::new_v4(),
            None,
            "Exam prep",
            datetime!(2025-03-01 09:30),
            datetime!(2025-03-01 11:00),
        );
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["start_time"], "2025-03-01T09:30");
        assert_eq!(json["end_time"], "2025-03-01T11:00");
        let back: StudySession = serde_json::from_value(json).unwrap();
        assert_eq!(back.start_time, s.start_time);
    }
}
