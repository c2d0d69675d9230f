//! Exchange-agnostic domain types for the dashboard client.

pub mod error;
pub mod id;
pub mod opportunity;
pub mod summary;
pub mod view;
pub mod wire;

pub use error::DomainError;
pub use id::OpportunityId;
pub use opportunity::{ArbitrageType, OpportunityRecord, TradeLeg};
pub use summary::{ScanOutcome, ScanReport, StatusFields, SummaryFields};
pub use view::{OpportunityView, SortKey, ViewParams};
