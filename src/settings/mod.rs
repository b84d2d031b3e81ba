//! Settings come from a TOML file plus `GROUPCAL_*` environment overrides.
//! See `bin/settings_demo.rs` for a binary that prints what was loaded.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
