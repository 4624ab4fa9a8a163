/// Primary keys. Remote rows are PostgreSQL BIGSERIAL; local fallback
/// records use millisecond-derived ids; demo accounts use negative ids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
