//! Workspace-wide constants.

/// Environment variable read by `init_tracing` for per-target log levels.
pub const LOG_ENV_VAR: &str = "CODENAV_LOG";

/// Filter used when `CODENAV_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "codenav=info";

/// Prefix for environment-variable config overrides.
pub const ENV_PREFIX: &str = "CODENAV_";

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "codenav.toml";

/// User-level config directory name under `$HOME`.
pub const USER_CONFIG_DIR: &str = ".codenav";

/// Upper bound on read connections in the pool.
pub const MAX_READ_POOL_SIZE: usize = 8;
