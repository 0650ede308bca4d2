//! Repository implementations for database operations

pub mod channels;
pub mod features;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod ledger;

pub use channels::*;
pub use features::*;
#[cfg(any(test, feature = "test-fixtures"))]
pub use ledger::*;
