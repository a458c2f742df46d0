//! CLI-side configuration: flag overrides layered onto TOML profiles.
//!
//! Core never sees these types; it receives a pre-built `ControllerConfig`.

use secrecy::SecretString;

use mikrosync_config::{Config, Profile};
use mikrosync_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, profile, and flags.
///
/// Flags win over the profile. With no matching profile, `--router` alone
/// is enough as long as credentials come from flags or the environment.
pub fn build_controller_config(
    global: &GlobalOpts,
    scan_interval: Option<u64>,
) -> Result<ControllerConfig, CliError> {
    let cfg = mikrosync_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let (mut profile, from_file) = match cfg.profiles.get(&profile_name) {
        Some(profile) => (profile.clone(), true),
        None if global.router.is_some() => (Profile::default(), false),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available.join(", "),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: mikrosync_config::config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global, scan_interval);

    let mut config =
        mikrosync_config::profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?;

    if let Some(ref password) = global.password {
        config.password = SecretString::from(password.clone());
    }
    if !from_file {
        config.name = config.url.host_str().unwrap_or("router").to_owned();
    }

    tracing::debug!(
        profile = %profile_name,
        url = %config.url,
        scan_interval_secs = config.scan_interval.as_secs(),
        track_arp = config.track_arp,
        "resolved router configuration"
    );
    Ok(config)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts, scan_interval: Option<u64>) {
    if let Some(ref router) = global.router {
        profile.router.clone_from(router);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    // Placeholder so resolution succeeds; the flag value replaces it after resolution.
    if global.password.is_some() && profile.password.is_none() {
        profile.password = Some(String::new());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.no_arp {
        profile.track_arp = Some(false);
    }
    if let Some(secs) = scan_interval {
        profile.scan_interval = Some(secs);
    }
}
