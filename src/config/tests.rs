use super::*;

#[test]
fn defaults_match_documented_cadence() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.refresh.interval, Duration::from_secs(600));
    assert_eq!(settings.session.activity_threshold, Duration::from_secs(600));
    assert_eq!(settings.backend.request_timeout, Duration::from_secs(15));
    assert_eq!(settings.refresh.recent_tags.get(), 500);
    assert_eq!(settings.refresh.upgrade_marker_field, "last_upgrade");
    assert!(settings.backend.url.is_none());
    assert!(!settings.router.test_mode);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.refresh.interval_seconds = Some(120);
    raw.logging.level = Some("info".to_string());

    let overrides = Overrides {
        refresh_interval_seconds: Some(30),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.refresh.interval, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = Overrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_interval_is_rejected() {
    let mut raw = RawSettings::default();
    raw.refresh.interval_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero interval");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "refresh.interval_seconds",
            ..
        }
    ));
}

#[test]
fn malformed_backend_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("not a url".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid url");
    assert!(matches!(err, LoadError::Invalid { key: "backend.url", .. }));
}

#[test]
fn blank_backend_url_means_unset() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.backend.url.is_none());
}

#[test]
fn test_mode_can_be_enabled_via_cli() {
    let args = CliArgs::parse_from(["taggr-client", "--router-test-mode", "yes", "snapshot"]);
    let mut raw = RawSettings::default();
    raw.apply_overrides(&args.overrides);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.router.test_mode);
    assert!(matches!(args.command, Some(Command::Snapshot)));
}

#[test]
fn default_to_watch_command() {
    let args = CliArgs::parse_from(["taggr-client"]);
    let command = args.command.unwrap_or(Command::Watch);
    assert!(matches!(command, Command::Watch));
}

#[test]
fn parse_route_arguments() {
    let args = CliArgs::parse_from([
        "taggr-client",
        "route",
        "#/user/alice",
        "--backend-url",
        "https://taggr.example",
    ]);

    match args.command.expect("route command") {
        Command::Route(route) => assert_eq!(route.hash, "#/user/alice"),
        other => panic!("unexpected command: {other:?}"),
    }
    assert_eq!(
        args.overrides.backend_url.as_deref(),
        Some("https://taggr.example")
    );
}

#[test]
fn default_settings_match_layered_defaults() {
    let layered = Settings::from_raw(RawSettings::default()).expect("valid settings");
    let fixed = Settings::default();

    assert_eq!(layered.refresh.interval, fixed.refresh.interval);
    assert_eq!(layered.refresh.recent_tags, fixed.refresh.recent_tags);
    assert_eq!(layered.session.activity_threshold, fixed.session.activity_threshold);
    assert_eq!(layered.backend.request_timeout, fixed.backend.request_timeout);
    assert_eq!(layered.logging.level, fixed.logging.level);
}
