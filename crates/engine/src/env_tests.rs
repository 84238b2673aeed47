// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_env() {
    for var in [
        "DN_PROJECT",
        "DN_REGION",
        "DN_BASE_URL",
        "DN_REPORTS_DIR",
        "DN_DRONE_IMAGE",
        "DN_RATE_MICROS_PER_MIN",
        "DN_DISPATCH_TIMEOUT_MS",
        "DN_PROBE_TIMEOUT_MS",
        "DN_HEALTH_INTERVAL_MS",
        "DN_TICK_MS",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn required_vars_are_required() {
    clear_env();
    assert_eq!(project(), Err(EnvError::MissingProject));
    assert_eq!(base_url(), Err(EnvError::MissingBaseUrl));
    std::env::set_var("DN_PROJECT", "");
    assert_eq!(project(), Err(EnvError::MissingProject));
    clear_env();
}

#[test]
#[serial]
fn defaults_apply_when_unset() {
    clear_env();
    assert_eq!(region(), "us-central1");
    assert_eq!(reports_dir(), PathBuf::from("reports"));
    assert_eq!(drone_image(), "dragnet-drone:latest");
    assert_eq!(dispatch_timeout(), Duration::from_secs(10));
    assert_eq!(probe_timeout(), Duration::from_secs(5));
    assert_eq!(health_interval(), Duration::from_secs(10));
    assert_eq!(completion_tick(), Duration::from_secs(5));
}

#[test]
#[serial]
fn settings_from_env_resolves_overrides() {
    clear_env();
    std::env::set_var("DN_PROJECT", "proj-1");
    std::env::set_var("DN_BASE_URL", "orchestrator.local:9000");
    std::env::set_var("DN_REGION", "europe-west4");
    std::env::set_var("DN_TICK_MS", "250");
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.project, "proj-1");
    assert_eq!(settings.region, "europe-west4");
    assert_eq!(settings.base_url, "orchestrator.local:9000");
    assert_eq!(settings.completion_tick, Duration::from_millis(250));
    clear_env();
}

#[test]
#[serial]
fn unparseable_durations_fall_back() {
    clear_env();
    std::env::set_var("DN_TICK_MS", "not-a-number");
    assert_eq!(completion_tick(), Duration::from_secs(5));
    clear_env();
}
