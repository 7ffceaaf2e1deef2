//! Behaviour suites and shared fixtures for the bridge.

mod bridge_behaviour;
pub(crate) mod support;
