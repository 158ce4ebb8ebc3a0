//! Business-hours policy for critical activities.

use chrono::{NaiveDateTime, Timelike};

use super::Anomaly;

/// Allowed hours `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy)]
pub struct PolicyWindow {
    start_hour: u32,
    end_hour: u32,
}

impl PolicyWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn allows(&self, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
    }

    pub fn observe(
        &self,
        critical: bool,
        actor: &str,
        activity: &str,
        ts: NaiveDateTime,
    ) -> Option<Anomaly> {
        if !critical || self.allows(ts.hour()) {
            return None;
        }
        Some(Anomaly::OffHours {
            timestamp: ts,
            actor: actor.to_string(),
            activity: activity.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at_hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 12)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_hour_boundaries() {
        let p = PolicyWindow::new(9, 18);
        assert!(p.observe(true, "UserB", "FILE_DELETE", at_hour(8)).is_some());
        assert!(p.observe(true, "UserB", "FILE_DELETE", at_hour(18)).is_some());
        assert!(p.observe(true, "UserB", "FILE_DELETE", at_hour(9)).is_none());
        assert!(p.observe(true, "UserB", "FILE_DELETE", at_hour(17)).is_none());
    }

    #[test]
    fn test_non_critical_is_ignored() {
        let p = PolicyWindow::new(9, 18);
        assert!(p.observe(false, "UserB", "LOGIN_SUCCESS", at_hour(23)).is_none());
    }

    #[test]
    fn test_late_night_record() {
        let p = PolicyWindow::new(9, 18);
        let ts = NaiveDate::from_ymd_opt(2025, 9, 12)
            .unwrap()
            .and_hms_opt(23, 45, 0)
            .unwrap();
        assert_eq!(
            p.observe(true, "UserB", "FILE_DELETE", ts),
            Some(Anomaly::OffHours {
                timestamp: ts,
                actor: "UserB".into(),
                activity: "FILE_DELETE".into(),
            })
        );
    }
}
