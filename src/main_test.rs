use std::sync::Mutex;

use super::*;

// Every test that reads `YAK_*` variables holds this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const YAK_VARS: [&str; 4] = ["YAK_BASE_URL", "YAK_STORAGE_PATH", "YAK_LEGACY_BEARER", "YAK_ERASE_STALE_TOKEN"];

/// # Safety
/// Caller must hold `ENV_LOCK`.
unsafe fn clear_yak_env() {
    for key in YAK_VARS {
        unsafe { std::env::remove_var(key) };
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("yak").chain(args.iter().copied())).unwrap()
}

// =============================================================================
// resolve_config
// =============================================================================

#[test]
fn flags_override_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_yak_env();
        std::env::set_var("YAK_BASE_URL", "https://env.example");
        std::env::set_var("YAK_STORAGE_PATH", "/tmp/env-session.json");
        std::env::set_var("YAK_LEGACY_BEARER", "off");
    }

    let cli = parse(&[
        "--base-url",
        "https://flag.example/",
        "--storage-path",
        "/tmp/flag-session.json",
        "--legacy-bearer",
        "status",
    ]);
    let config = resolve_config(&cli).unwrap();
    assert_eq!(config.base_url, "https://flag.example");
    assert_eq!(config.storage_path, PathBuf::from("/tmp/flag-session.json"));
    assert_eq!(config.auth_scheme, AuthScheme::LegacyColon);

    unsafe { clear_yak_env() };
}

#[test]
fn env_applies_without_flags() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_yak_env();
        std::env::set_var("YAK_BASE_URL", "https://env.example");
        std::env::set_var("YAK_LEGACY_BEARER", "1");
        std::env::set_var("YAK_ERASE_STALE_TOKEN", "no");
    }

    let config = resolve_config(&parse(&["groups"])).unwrap();
    assert_eq!(config.base_url, "https://env.example");
    assert_eq!(config.auth_scheme, AuthScheme::LegacyColon);
    assert!(!config.erase_stale_token);

    unsafe { clear_yak_env() };
}

#[test]
fn empty_base_url_flag_errors() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_yak_env() };

    let err = resolve_config(&parse(&["--base-url", " / ", "status"])).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

// =============================================================================
// Command tree
// =============================================================================

#[test]
fn api_commands_parse_into_api_variant() {
    let cli = parse(&["bet", "m1", "--score1", "2", "--score2", "0", "--post"]);
    let Command::Api(ApiCommand::Bet(args)) = cli.command else {
        panic!("expected bet command");
    };
    assert_eq!(args.match_id, "m1");
    assert_eq!((args.score1, args.score2), (Some(2), Some(0)));
    assert!(args.post);

    assert!(matches!(parse(&["score-board"]).command, Command::Api(ApiCommand::ScoreBoard)));
    assert!(matches!(parse(&["group", "A"]).command, Command::Api(ApiCommand::Group { .. })));
}

#[test]
fn session_commands_stay_outside_api_variant() {
    assert!(matches!(parse(&["logout"]).command, Command::Logout));
    assert!(matches!(parse(&["navigate", "/score_board"]).command, Command::Navigate { .. }));
}
