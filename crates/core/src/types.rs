use chrono::SubsecRound;

/// Books are keyed by a UUID generated at creation time.
pub type BookId = uuid::Uuid;

/// Status-change rows use a PostgreSQL BIGSERIAL key.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current time truncated to microseconds, the precision of `TIMESTAMPTZ`.
///
/// Values captured here survive a database round trip unchanged.
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(6)
}
