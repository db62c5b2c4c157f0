//! CLI commands

mod check;
mod serve;

pub use check::CheckCommand;
pub use serve::{PreviewHandler, ServeCommand};
