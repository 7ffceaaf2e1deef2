//! Shared fixtures for the bridge test suites.

mod client;
mod host;
mod reporter;
mod resolver;

pub use client::TestClient;
pub use host::HostHarness;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use resolver::{MockResolver, resolver_with_types, synthetic_types};
