//! # couchctl: admin reporting CLI for hosted database clusters
//!
//! Facade crate that re-exports the couchctl workspace crates so
//! consumers can depend on a single `couchctl` library.
//!
//! ## Crate breakdown
//!
//! | Module | Crate | Purpose |
//! |--------|-------|---------|
//! | [`core`] | couchctl-core | Types, node naming, sampling arithmetic, formatting |
//! | [`api`] | couchctl-api | Typed HTTP client, response schema, worker pool |
//! | [`cli`] | couchctl-cli | Clap commands, report rendering, UI |

pub use couchctl_api as api;
pub use couchctl_cli as cli;
pub use couchctl_core as core;
