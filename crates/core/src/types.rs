/// Primary keys are UUIDs; user ids are issued by the managed auth service.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
