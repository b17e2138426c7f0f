use super::*;

// =============================================================================
// LoginGrant
// =============================================================================

#[test]
fn grant_from_bare_token_response() {
    let body = serde_json::json!({ "token": "a.b.c" });
    let grant = LoginGrant::from_response(&body).unwrap();
    assert_eq!(grant.token, "a.b.c");
    assert_eq!(grant.name, None);
}

#[test]
fn grant_from_envelope_response() {
    let body = serde_json::json!({
        "ok": true,
        "result": { "id": "0b5c", "name": "alice", "token": "a.b.c" }
    });
    let grant = LoginGrant::from_response(&body).unwrap();
    assert_eq!(grant.token, "a.b.c");
    assert_eq!(grant.name.as_deref(), Some("alice"));
}

#[test]
fn grant_missing_token_is_none() {
    assert!(LoginGrant::from_response(&serde_json::json!({ "ok": true, "result": {} })).is_none());
    assert!(LoginGrant::from_response(&serde_json::Value::Null).is_none());
}

// =============================================================================
// error_message
// =============================================================================

#[test]
fn error_message_prefers_description() {
    let body = r#"{"ok":false,"error_code":401,"description":"Invalid credentials"}"#;
    assert_eq!(error_message(body), "Invalid credentials");
}

#[test]
fn error_message_without_ok_flag_uses_description() {
    assert_eq!(error_message(r#"{"description":"Group not found"}"#), "Group not found");
}

#[test]
fn error_message_ignores_success_envelope() {
    let body = r#"{"ok":true,"description":"not an error"}"#;
    assert_eq!(error_message(body), body);
}

#[test]
fn error_message_falls_back_to_raw_body() {
    assert_eq!(error_message("  Bad Gateway\n"), "Bad Gateway");
}

// =============================================================================
// Bodies
// =============================================================================

#[test]
fn score_prediction_serializes_nested_scores() {
    let json = serde_json::to_value(ScorePrediction::new(Some(2), None)).unwrap();
    assert_eq!(json, serde_json::json!({ "team1": { "score": 2 }, "team2": { "score": null } }));
}

#[test]
fn registration_credentials_reuse_name_and_password() {
    let registration = Registration {
        name: "alice".into(),
        first_name: "Alice".into(),
        last_name: "Liddell".into(),
        password: "hunter2".into(),
    };
    assert_eq!(registration.credentials(), Credentials { name: "alice".into(), password: "hunter2".into() });
}
