//! # Fixtures
//!
//! Setup/teardown units that hand prepared state to the scenario:
//!
//! - [`ResourceFixture`] creates the project through the API and owns its teardown
//! - [`with_mobile_context`] yields an isolated context emulating the configured device

pub mod data;
pub mod mobile;

pub use data::{ResourceFixture, TeardownOutcome};
pub use mobile::with_mobile_context;
