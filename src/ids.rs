use chrono::Utc;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Millisecond timestamp rendered as a string, bumped forward until `is_taken`
/// no longer claims it. Two creations within the same millisecond still get
/// distinct ids.
pub fn time_derived_id(now_ms: i64, is_taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !is_taken(&id) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::time_derived_id;

    #[test]
    fn uses_timestamp_when_free() {
        assert_eq!(time_derived_id(1_700_000_000_000, |_| false), "1700000000000");
    }

    #[test]
    fn bumps_past_taken_ids() {
        let taken = ["42", "43"];
        let id = time_derived_id(42, |candidate| taken.contains(&candidate));
        assert_eq!(id, "44");
    }
}
