//! Application services (use cases).
//!
//! The store, the connection state machine and the coordinator are all
//! synchronous and owned by one sync loop; the authority client is the only
//! piece that performs I/O.

pub mod authority;
pub mod connection;
pub mod coordinator;
pub mod message;
pub mod store;

pub use authority::AuthorityClient;
pub use connection::{
    ConnectionManager, ConnectionSignal, ConnectionState, ReconnectPolicy, Wakeup,
};
pub use coordinator::{FollowUp, SyncCoordinator};
pub use message::InboundMessage;
pub use store::{OpportunityStore, ReplaceSummary};
