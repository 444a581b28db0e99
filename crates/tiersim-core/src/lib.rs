//! tiersim Core - Shared types and traits
//!
//! This crate defines the data model used by the simulator engine and its
//! front ends:
//! - tiersim-engine (simulator state, session driver)
//! - tiersim (terminal binary, built from tiersim-engine)
//!
//! Key types:
//! - StorageTier (ordered storage classes)
//! - LifecyclePolicy (day thresholds and the transition rule)
//! - PriceTable (storage and retrieval prices, cost estimation)
//! - Presenter trait (the only way anything is shown to a user)
//! - Error types

pub mod error;
pub mod policy;
pub mod pricing;
pub mod traits;
pub mod types;

pub use error::*;
pub use policy::*;
pub use pricing::*;
pub use traits::*;
pub use types::*;
