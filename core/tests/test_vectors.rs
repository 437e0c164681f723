//! Verify response classification against the JSON vectors in `test-vectors/`.
//!
//! Each case is a simulated status and body plus the expected outcome.
//! Successful results are compared as decoded values, not raw strings.

use telegram_core::{decode_response, ApiError, User};

fn outcome(result: &Result<User, ApiError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ApiError::HttpStatus { .. }) => "http_status",
        Err(ApiError::Protocol { .. }) => "protocol",
        Err(ApiError::Application { .. }) => "application",
        Err(ApiError::ResultShape { .. }) => "result_shape",
        Err(other) => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();
        let expect = case["expect"].as_str().unwrap();

        let result = decode_response::<User>(status, "", body);
        assert_eq!(outcome(&result), expect, "{name}: outcome");

        match result {
            Ok(user) => {
                let expected: User = serde_json::from_value(case["result"].clone()).unwrap();
                assert_eq!(user, expected, "{name}: decoded result");
            }
            Err(err) => {
                assert_eq!(err.body(), Some(body), "{name}: raw body kept");
                let text = err.to_string();
                match expect {
                    "http_status" => {
                        assert_eq!(err.status(), Some(status), "{name}: status");
                        assert!(text.contains(&status.to_string()), "{name}: status in message");
                        assert!(text.contains(body), "{name}: body in message");
                    }
                    "application" => {
                        assert!(text.contains(body), "{name}: body in message");
                    }
                    _ => {}
                }
            }
        }
    }
}

#[test]
fn application_failure_exposes_description_and_code() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let case = vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "ok_false_with_message")
        .unwrap();

    let err = decode_response::<User>(200, "OK", case["body"].as_str().unwrap()).unwrap_err();
    match err {
        ApiError::Application {
            error_code,
            description,
            ..
        } => {
            assert_eq!(error_code, None);
            assert_eq!(description.as_deref(), Some("operation refused"));
        }
        other => panic!("expected application failure, got {other:?}"),
    }
}
