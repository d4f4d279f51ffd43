//! Platform abstraction layer
//!
//! Real receiver and radio managers are provided by the board support
//! package. This module only carries the host-side mocks used by unit and
//! integration tests.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
