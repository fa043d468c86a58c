//! Data Transfer Objects for REST request/response serialization.
//!
//! Response bodies use camelCase field names.

pub mod pool_dto;
pub mod webhook_dto;

pub use pool_dto::*;
pub use webhook_dto::*;
