//! Solver settings. Each setting has a default that can be overridden through an environment
//! variable, which is read once on first access:
//!
//! ```
//! use gridfill::config::SolverConfig;
//!
//! // GRIDFILL_MAINTAIN_ARC_CONSISTENCY not set, so the default is used.
//! let config = SolverConfig::default();
//! assert!(!config.maintain_arc_consistency);
//! ```

use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing::warn;

/// Should the search re-run arc consistency after every tentative choice?
pub static MAINTAIN_ARC_CONSISTENCY: EnvParam<bool> =
    EnvParam::new("GRIDFILL_MAINTAIN_ARC_CONSISTENCY", false);

/// A global parameter initialized from the environment variable `env`, falling back to `default`
/// if the variable is unset or can't be parsed.
pub struct EnvParam<T> {
    value: OnceCell<T>,
    env: &'static str,
    default: T,
}

impl<T> EnvParam<T> {
    pub const fn new(env: &'static str, default: T) -> EnvParam<T> {
        EnvParam { value: OnceCell::new(), env, default }
    }
}

impl<T: FromStr + Clone> EnvParam<T> {
    /// Returns the value of the parameter, reading the environment variable on the first call.
    pub fn get(&self) -> T {
        self.value
            .get_or_init(|| match std::env::var(self.env) {
                Ok(param) => T::from_str(param.trim()).unwrap_or_else(|_| {
                    warn!(env = self.env, value = %param, "could not parse parameter, using default");
                    self.default.clone()
                }),
                Err(_) => self.default.clone(),
            })
            .clone()
    }
}

/// Knobs for a single fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// After each choice that passes the consistency check, narrow the chosen slot to that word
    /// and propagate arc consistency through the rest of the grid, rolling the domains back when
    /// the branch is abandoned. Off by default: the plain search only ever touches the
    /// assignment.
    pub maintain_arc_consistency: bool,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig { maintain_arc_consistency: MAINTAIN_ARC_CONSISTENCY.get() }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EnvParam;

    #[test]
    fn test_env_param_reads_environment_once() {
        static PARAM: EnvParam<u32> = EnvParam::new("GRIDFILL_TEST_ENV_PARAM_READ", 3);

        std::env::set_var("GRIDFILL_TEST_ENV_PARAM_READ", "9");
        assert_eq!(PARAM.get(), 9);

        std::env::set_var("GRIDFILL_TEST_ENV_PARAM_READ", "12");
        assert_eq!(PARAM.get(), 9);
    }

    #[test]
    fn test_env_param_falls_back_to_default() {
        static UNSET: EnvParam<bool> = EnvParam::new("GRIDFILL_TEST_ENV_PARAM_UNSET", true);
        static INVALID: EnvParam<bool> = EnvParam::new("GRIDFILL_TEST_ENV_PARAM_INVALID", true);

        std::env::set_var("GRIDFILL_TEST_ENV_PARAM_INVALID", "sometimes");
        assert!(UNSET.get());
        assert!(INVALID.get());
    }
}
