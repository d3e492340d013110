// couchctl-cli: Clap commands, report rendering, UI
// Depends on couchctl-core and couchctl-api.

pub mod commands;
pub mod databases;
pub mod dbinfo;
pub mod disk;
pub mod display;
pub mod logging;
pub mod replicate;
pub mod shards;
pub mod tasks;
pub mod ui;

pub use commands::run;
