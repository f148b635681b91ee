mod args;
pub mod cli;
mod commands;
mod exit;
pub mod host;
mod logging;
pub mod plugin;

pub use host::Host;
pub use host::ProcessHost;
pub use plugin::PyrightPlugin;
