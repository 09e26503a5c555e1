//! CLI command implementations.

mod analyze;
mod config;
mod embed;
mod list;
mod search;
mod serve;
mod transcribe;

pub use analyze::run_analyze;
pub use config::run_config;
pub use embed::run_embed;
pub use list::run_list;
pub use search::run_search;
pub use serve::run_serve;
pub use transcribe::run_transcribe;
