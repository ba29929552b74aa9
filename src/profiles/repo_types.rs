use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::Record,
};

pub const DAYS: usize = 7;
pub const MAX_HOUR: u8 = 24;

/// Student profile; at most one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub major: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    /// Preferred hours per weekday: start for day `d` at `d`, end at `d + 7`.
    #[serde(default)]
    pub preferences: [u8; DAYS * 2],
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Profile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: None,
            major: None,
            availability: Vec::new(),
            preferences: [0; DAYS * 2],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn set_name(&mut self, name: &str) -> AppResult<()> {
        self.name = Some(non_blank(name, "Name cannot be empty")?);
        Ok(())
    }

    pub fn set_major(&mut self, major: &str) -> AppResult<()> {
        self.major = Some(non_blank(major, "Major cannot be empty")?);
        Ok(())
    }

    /// Replace availability, trimming entries and dropping blanks and repeats.
    pub fn set_availability(&mut self, slots: &[String]) {
        let mut out: Vec<String> = Vec::with_capacity(slots.len());
        for slot in slots.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !out.iter().any(|s| s == slot) {
                out.push(slot.to_string());
            }
        }
        self.availability = out;
    }

    pub fn set_preference(&mut self, day: i64, start: i64, end: i64) -> AppResult<()> {
        let day = usize::try_from(day)
            .ok()
            .filter(|d| *d < DAYS)
            .ok_or_else(|| AppError::validation("Day must be between 0 and 6"))?;
        let hour = |h: i64| {
            u8::try_from(h)
                .ok()
                .filter(|h| *h <= MAX_HOUR)
                .ok_or_else(|| AppError::validation("Hours must be between 0 and 24"))
        };
        let (start, end) = (hour(start)?, hour(end)?);
        if start >= end {
            return Err(AppError::validation("Start hour must be before end hour"));
        }
        self.preferences[day] = start;
        self.preferences[day + DAYS] = end;
        Ok(())
    }
}

fn non_blank(value: &str, msg: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(msg));
    }
    Ok(value.to_string())
}

impl Record for Profile {
    const ENTITY: &'static str = "Profile";
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_slots_follow_day_layout() {
        let mut p = Profile::new(Uuid::new_v4());
        p.set_preference(2, 9, 17).unwrap();
        assert_eq!(p.preferences[2], 9);
        assert_eq!(p.preferences[9], 17);
        assert_eq!(p.preferences.iter().filter(|h| **h != 0).count(), 2);
    }

    #[test]
    fn preference_rejects_bad_ranges() {
        let mut p = Profile::new(Uuid::new_v4());
        for (day, start, end) in [(7, 9, 10), (-1, 9, 10), (0, 10, 10), (0, 12, 8), (0, 0, 25), (0, -2, 4)] {
            assert!(p.set_preference(day, start, end).is_err(), "{day} {start} {end}");
        }
        assert_eq!(p.preferences, [0; 14]);
        p.set_preference(6, 0, 24).unwrap();
    }

    #[test]
    fn availability_is_deduplicated_in_order() {
        let mut p = Profile::new(Uuid::new_v4());
        p.set_availability(&["Mon".into(), " Tue ".into(), "Mon".into(), "".into(), "Tue".into()]);
        assert_eq!(p.availability, ["Mon", "Tue"]);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = Profile::new(Uuid::new_v4());
        assert_eq!(p.set_name("   ").unwrap_err().to_string(), "Name cannot be empty");
        p.set_name(" Ada ").unwrap();
        assert_eq!(p.name.as_deref(), Some("Ada"));
    }
}
