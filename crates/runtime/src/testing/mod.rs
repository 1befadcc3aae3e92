//! Test doubles for code that executes actions.

pub mod assertions;
pub mod fake;

pub use assertions::ResultAssertions;
pub use fake::{FakeDispatcher, FAKE_MODEL, FAKE_PROVIDER};
