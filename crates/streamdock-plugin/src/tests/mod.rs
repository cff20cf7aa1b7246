//! Crate-level tests for `streamdock_plugin`.
