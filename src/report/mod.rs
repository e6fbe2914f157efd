pub mod runner;
pub mod summary;

pub use runner::Auditor;
pub use summary::AuditReport;
