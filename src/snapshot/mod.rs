//! Point-in-time host snapshots: the value type, how it is built, and where it lives.
//! Used by: scheduler, service, state, handlers::status.

pub mod model;
pub mod producer;
pub mod store;

pub use model::{ExtensionInfo, PlayerInfo, Snapshot};
pub use producer::SnapshotProducer;
pub use store::SnapshotStore;
