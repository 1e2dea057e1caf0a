pub const APP_NAME: &str = "pkgwrap";

/// Marker written into a staged tree once every source path has been copied.
pub const STAGE_COMPLETE_MARKER: &str = ".pkgwrap-complete";

/// Presence of this file inside a working-directory asset path opts it out of
/// automatic synchronization.
pub const UNMANAGED_SENTINEL: &str = ".pkgwrap-unmanaged";

pub const LAUNCH_PLAN_FILE: &str = "launch.json";

/// Runtime configuration file, relative to the launcher's working directory.
pub const RUNTIME_CONFIG_FILE: &str = "config.yml";

/// Exit status of the primary launcher after it scaffolded a config that
/// still needs editing (EX_CONFIG from sysexits.h).
pub const CONFIG_PENDING_EXIT_CODE: i32 = 78;

pub const EDITOR_VAR: &str = "EDITOR";
