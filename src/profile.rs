//! Environment profiles.
//!
//! A [`Profile`] names an environment tier (`prod`, `stage`, ...) with an
//! optional single-parent fallback: being in `prod` permits falling back to
//! `stage` services when no prod-specific configuration exists. The standard
//! profiles form a fixed chain rooted at `default`; custom profiles can be
//! created from any code and fall back to `default`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;

/// Environment variable that names the active profile directly.
pub const PROFILE_ENV: &str = "CONNECTION_PROFILE";

/// Environment marker (`IS_CI=true`) indicating a CI environment.
pub const CI_MARKER: &str = "IS_CI";

/// A named environment profile with an optional fallback.
///
/// Equality, ordering and hashing consider only the case-folded code:
/// `Profile::get("DEV") == Profile::get("dev")`.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Profile code (`prod`, `stage`, ...).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Profile to fall back to when this one has no configuration.
    pub fallback: Option<Box<Profile>>,
}

static STANDARD: Lazy<Vec<Profile>> = Lazy::new(|| {
    let default = Profile {
        code: "default".into(),
        name: "Default profile".into(),
        fallback: None,
    };
    let local = Profile {
        code: "local".into(),
        name: "Developer's local environment".into(),
        fallback: Some(Box::new(default.clone())),
    };
    let ci = Profile {
        code: "ci".into(),
        name: "CI environment".into(),
        fallback: Some(Box::new(local.clone())),
    };
    let dev = Profile {
        code: "dev".into(),
        name: "Dev stand".into(),
        fallback: Some(Box::new(local.clone())),
    };
    let stage = Profile {
        code: "stage".into(),
        name: "Stage stand".into(),
        fallback: Some(Box::new(dev.clone())),
    };
    let prod = Profile {
        code: "prod".into(),
        name: "Prod stand".into(),
        fallback: Some(Box::new(stage.clone())),
    };
    vec![default, local, ci, dev, stage, prod]
});

impl Profile {
    /// The `default` profile, root of every fallback chain.
    #[must_use]
    pub fn default_profile() -> Profile {
        STANDARD[0].clone()
    }

    /// The standard profiles: default, local, ci, dev, stage, prod.
    #[must_use]
    pub fn standard() -> &'static [Profile] {
        &STANDARD
    }

    /// Looks a profile up by code, case-insensitively.
    ///
    /// Unknown codes produce a custom profile falling back to `default`.
    #[must_use]
    pub fn get(code: &str) -> Profile {
        STANDARD
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
            .cloned()
            .unwrap_or_else(|| Profile {
                code: code.to_string(),
                name: String::new(),
                fallback: Some(Box::new(Profile::default_profile())),
            })
    }

    /// Detects the active profile from an environment lookup.
    ///
    /// An explicit [`PROFILE_ENV`] value wins; a [`CI_MARKER`] of `true`
    /// selects `ci`; otherwise `local`.
    pub fn auto_detect<F>(env: F) -> Profile
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(code) = env(PROFILE_ENV) {
            if !code.trim().is_empty() {
                return Profile::get(&code);
            }
        }
        if env(CI_MARKER).as_deref() == Some("true") {
            return Profile::get("ci");
        }
        Profile::get("local")
    }

    fn folded_code(&self) -> String {
        self.code.to_lowercase()
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.folded_code() == other.folded_code()
    }
}

impl Eq for Profile {}

impl PartialOrd for Profile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Profile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded_code().cmp(&other.folded_code())
    }
}

impl Hash for Profile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded_code().hash(state);
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_standard_case_insensitive() {
        assert_eq!(Profile::get("DEV"), Profile::get("dev"));
        assert_eq!(Profile::get("Prod").name, "Prod stand");
    }

    #[test]
    fn test_get_custom_falls_back_to_default() {
        let custom = Profile::get("sandbox");
        assert_eq!(custom.code, "sandbox");
        assert_eq!(
            custom.fallback.as_deref(),
            Some(&Profile::default_profile())
        );
    }

    #[test]
    fn test_fallback_chain() {
        let prod = Profile::get("prod");
        let stage = prod.fallback.as_deref().unwrap();
        assert_eq!(stage.code, "stage");
        let dev = stage.fallback.as_deref().unwrap();
        assert_eq!(dev.code, "dev");
        let local = dev.fallback.as_deref().unwrap();
        assert_eq!(local.code, "local");
        let default = local.fallback.as_deref().unwrap();
        assert_eq!(default.code, "default");
        assert!(default.fallback.is_none());
    }

    #[test]
    fn test_equality_by_code_only() {
        let a = Profile {
            code: "x".into(),
            name: "one".into(),
            fallback: None,
        };
        let b = Profile {
            code: "X".into(),
            name: "two".into(),
            fallback: Some(Box::new(Profile::default_profile())),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_auto_detect_explicit_wins() {
        let env = |k: &str| match k {
            PROFILE_ENV => Some("stage".to_string()),
            CI_MARKER => Some("true".to_string()),
            _ => None,
        };
        assert_eq!(Profile::auto_detect(env).code, "stage");
    }

    #[test]
    fn test_auto_detect_ci_marker() {
        let env = |k: &str| (k == CI_MARKER).then(|| "true".to_string());
        assert_eq!(Profile::auto_detect(env).code, "ci");
    }

    #[test]
    fn test_auto_detect_defaults_to_local() {
        assert_eq!(Profile::auto_detect(|_| None).code, "local");
    }
}
