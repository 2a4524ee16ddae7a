//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and either an expected parse result or an expected error. Bodies are
//! compared as parsed JSON so field order does not matter.

use foodlog_core::{
    AddedFoodItem, ApiError, ChatTurn, Credentials, DeletedRecord, FoodDescription,
    FoodLogClient, HttpMethod, HttpRequest, HttpResponse, LoginData, WeightRecord,
};
use serde_json::Value;

const ORIGIN: &str = "http://localhost:8000";

fn client() -> FoodLogClient {
    FoodLogClient::new(ORIGIN)
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    assert_eq!(
        req.url,
        format!("{ORIGIN}{}", expected["path"].as_str().unwrap()),
        "{name}: url"
    );

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (
                arr[0].as_str().unwrap().to_string(),
                arr[1].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let actual: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
            // add_food_item vectors list only the plain fields here
            for (key, value) in body.as_object().unwrap() {
                assert_eq!(&actual[key], value, "{name}: body.{key}");
            }
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn check_error(name: &str, err: ApiError, expected: &Value) {
    match expected["kind"].as_str().unwrap() {
        "ServerError" => {
            let ApiError::ServerError { status, message } = err else {
                panic!("{name}: expected ServerError, got {err:?}");
            };
            assert_eq!(u64::from(status), expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
        }
        "DecodingFailure" => assert!(
            matches!(err, ApiError::DecodingFailure(_)),
            "{name}: expected DecodingFailure, got {err:?}"
        ),
        "InvalidResponse" => assert!(
            matches!(err, ApiError::InvalidResponse(_)),
            "{name}: expected InvalidResponse, got {err:?}"
        ),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/login.json")) {
        let name = case["name"].as_str().unwrap();
        let input: Credentials = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_login(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_login(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: LoginData =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Weight trend
// ---------------------------------------------------------------------------

#[test]
fn weight_trend_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/weight_trend.json")) {
        let name = case["name"].as_str().unwrap();
        let user_id = case["input_id"].as_u64().unwrap();

        let req = c.build_get_weight_trend(user_id).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_get_weight_trend(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Vec<WeightRecord> =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Add food item
// ---------------------------------------------------------------------------

#[test]
fn add_food_item_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/add_food_item.json")) {
        let name = case["name"].as_str().unwrap();
        let image_id = case["input_image_id"].as_u64().unwrap();
        let input: FoodDescription = serde_json::from_value(case["input"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        let req = c.build_add_food_item(image_id, &input).unwrap();
        check_request(name, &req, expected_req);

        // The description is a string holding JSON, not a nested object.
        let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        let encoded = body["description"].as_str().unwrap();
        let decoded: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(decoded, expected_req["decoded_description"], "{name}: description");

        let result = c.parse_add_food_item(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: AddedFoodItem =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete record
// ---------------------------------------------------------------------------

#[test]
fn delete_record_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete_record.json")) {
        let name = case["name"].as_str().unwrap();
        let record_id = case["input_id"].as_u64().unwrap();

        let req = c.build_delete_record(record_id).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_record(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: DeletedRecord =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[test]
fn chat_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/chat.json")) {
        let name = case["name"].as_str().unwrap();
        let user_id = case["input_id"].as_u64().unwrap();
        let message = case["input_message"].as_str().unwrap();
        let history: Vec<ChatTurn> =
            serde_json::from_value(case["input_history"].clone()).unwrap();

        let req = c.build_send_chat_message(user_id, message, &history).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_send_chat_message(simulated(&case)).unwrap();
        let expected: Vec<ChatTurn> =
            serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result, expected, "{name}: parsed result");
    }
}
