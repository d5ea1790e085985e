mod audit;
mod record;

pub use self::audit::AuditEntry;
pub(crate) use self::audit::AuditRow;
pub use self::record::StoredRecord;
pub(crate) use self::record::RecordRow;
