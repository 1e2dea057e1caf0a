//! pkgwrap-lib: build, stage and wrap a Node reverse-proxy distribution.
//!
//! The pipeline runs in three stages:
//! - `config`/`env`: resolve the recipe and merge the launcher environment
//! - `source`: vendor the font and run the backend-specific build scripts
//! - `stage`/`wrap`: assemble the staged tree and generate launchers
//!
//! `launch` is the runtime half: the bootstrap the primary launcher runs in
//! its working directory before handing over to the server.

pub mod config;
pub mod consts;
pub mod env;
pub mod launch;
pub mod layout;
pub mod package;
pub mod runtime_config;
pub mod source;
pub mod stage;
pub mod util;
pub mod wrap;
