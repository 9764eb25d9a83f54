//! Global subscriber installation

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable read by [`init_from_env`]
pub const PROFILE_ENV: &str = "KVRECON_LOG_PROFILE";

/// Output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Human-readable lines, `debug` and up
    #[default]
    Development,
    /// One JSON object per event, `info` and up
    Production,
    /// Nothing is printed; pair with `init_test_capture()`
    Test,
}

impl Profile {
    /// Directive used when `RUST_LOG` is unset
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "kvrecon=debug",
            Profile::Production => "kvrecon=info",
            Profile::Test => "off",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Profile::Development),
            "prod" | "production" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log profile `{}`", other)),
        }
    }
}

static INIT: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call in a process has any effect. If the host application
/// already installed a subscriber, that one is kept.
pub fn init(profile: Profile) {
    INIT.call_once(|| {
        let filter = profile.filter();
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        if installed.is_ok() {
            tracing::debug!(profile = ?profile, "logging initialized");
        }
    });
}

/// [`init`] with the profile named by `KVRECON_LOG_PROFILE`
///
/// Unset or unrecognized values fall back to [`Profile::Development`].
/// Returns the profile that was requested.
pub fn init_from_env() -> Profile {
    let profile = std::env::var(PROFILE_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    init(profile);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init(Profile::Test);
        init(Profile::Production);
    }

    #[test]
    fn test_init_from_env_reads_profile() {
        std::env::set_var(PROFILE_ENV, "test");
        assert_eq!(init_from_env(), Profile::Test);
    }

    #[test]
    fn test_profile_names() {
        assert_eq!("dev".parse::<Profile>().unwrap(), Profile::Development);
        assert_eq!(" Production ".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!("test".parse::<Profile>().unwrap(), Profile::Test);
        assert!("verbose".parse::<Profile>().is_err());
    }

    #[test]
    fn test_directives() {
        assert_eq!(Profile::default().default_directive(), "kvrecon=debug");
        assert_eq!(Profile::Production.default_directive(), "kvrecon=info");
        assert_eq!(Profile::Test.default_directive(), "off");
    }
}
