//! Web session rows.
//!
//! The payload is opaque to this crate; the web application owns its shape.

use chrono::NaiveDateTime;
use serde_json::Value;

/// A stored session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub sid: String,
    pub sess: Value,
    pub expire: NaiveDateTime,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expire <= now
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_is_expired() {
        let now = NaiveDate::from_ymd_opt(2025, 11, 19)
            .unwrap()
            .and_hms_opt(20, 22, 0)
            .unwrap();
        let session = Session {
            sid: "abc".to_owned(),
            sess: json!({ "cookie": { "maxAge": 3600 } }),
            expire: now + Duration::hours(1),
        };

        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(1)));
    }
}
