// Library target exists for the integration tests under tests/.
// The binary entry point is main.rs; this file re-declares the module tree so
// tests can drive sessions and documents via `keybasket::session::*` /
// `keybasket::store::*`.
// Some code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod app;
pub mod config;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
