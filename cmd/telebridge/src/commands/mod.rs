//! CLI commands module.

mod downsample;
mod info;
mod upsample;
mod util;

pub use downsample::DownsampleCommand;
pub use info::InfoCommand;
pub use upsample::UpsampleCommand;

pub(crate) use util::*;
