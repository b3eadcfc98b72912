//! CLI command handlers.
//!
//! - `upload` - Check and upload every catalog file
//! - `setup` - Locate or download the upload client
//! - `preflight` - Run preflight checks
//! - `show` - Display configuration and the resolved upload plan

mod preflight;
mod setup;
pub mod show;
mod upload;

pub use preflight::cmd_preflight;
pub use setup::cmd_setup;
pub use show::cmd_show;
pub use upload::{cmd_upload, run_upload};
