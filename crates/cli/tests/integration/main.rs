//! CLI integration tests: build, install, verify and the generated launchers.

mod common;

mod build_tests;
#[cfg(unix)]
mod launch_tests;
mod verify_tests;
