use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}

/// Next modification timestamp: never earlier than, nor equal to, the
/// previous one.
pub fn next_modified_at(previous: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    let floor = previous + Duration::microseconds(1);
    now.max(floor)
}

/// Current UTC time truncated to the microsecond precision Postgres stores.
pub fn now_micros() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    let micros = now.and_utc().timestamp_micros();
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc())
        .unwrap_or(now)
}
