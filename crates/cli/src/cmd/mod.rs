mod build;
mod check;
mod launch;
mod verify;

pub use build::{cmd_build, cmd_install};
pub use check::cmd_check;
pub use launch::cmd_launch;
pub use verify::cmd_verify;
