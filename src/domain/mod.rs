//! Domain layer: webhook input, detected pools, and stored records.
//!
//! This module contains the service-side model: the transaction
//! notification as delivered, the pool candidate the parser derives from
//! it, and the pool/event rows the persistence layer stores.

pub mod notification;
pub mod pool_candidate;
pub mod pool_event;
pub mod pool_id;
pub mod pool_record;

pub use notification::{TokenTransfer, TransactionNotification};
pub use pool_candidate::PoolCandidate;
pub use pool_event::{NewPoolEvent, PoolEventKind, PoolEventRecord};
pub use pool_id::PoolId;
pub use pool_record::{Enrichment, NewPool, PoolRecord};
