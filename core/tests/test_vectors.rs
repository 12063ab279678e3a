//! Check request building and status dispatch against the JSON vectors in
//! `test-vectors/`.
//!
//! The vectors are plain data so the same cases can drive any client
//! implementation of the wire contract.

use serde_json::Value;
use simple_http::{
    AllowedCodes, Flavor, HttpMethod, HttpRequest, JsonHttpRequest, NoBody, QueryParams,
    QueryValue, Request, ResponseParts, StatusKind, UrlencodedBody,
};

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn kind_name(kind: &StatusKind) -> &'static str {
    match kind {
        StatusKind::BadRequest => "BadRequest",
        StatusKind::Unauthorized => "Unauthorized",
        StatusKind::Forbidden => "Forbidden",
        StatusKind::NotFound => "NotFound",
        StatusKind::MethodNotAllowed => "MethodNotAllowed",
        StatusKind::NotAcceptable => "NotAcceptable",
        StatusKind::ProxyAuthenticationRequired => "ProxyAuthenticationRequired",
        StatusKind::TooManyRequests => "TooManyRequests",
        StatusKind::InternalServerError => "InternalServerError",
        StatusKind::NotImplemented => "NotImplemented",
        StatusKind::BadGateway => "BadGateway",
        StatusKind::ServiceUnavailable => "ServiceUnavailable",
        StatusKind::GatewayTimeout => "GatewayTimeout",
        StatusKind::UnexpectedHttpCode { .. } => "UnexpectedHttpCode",
    }
}

#[test]
fn status_code_vectors() {
    for case in cases(include_str!("../../test-vectors/status_codes.json")) {
        let name = case["name"].as_str().unwrap();
        let http_code = case["http_code"].as_u64().unwrap() as u16;
        let allowed = match &case["allowed"] {
            Value::Array(codes) => AllowedCodes::from(
                codes.iter().map(|c| c.as_u64().unwrap() as u16).collect::<Vec<_>>(),
            ),
            code => AllowedCodes::from(code.as_u64().unwrap() as u16),
        };

        let url = "https://example.com";
        let response = HttpRequest::new(url).make_response(ResponseParts::new(http_code, url));
        let result = response.check_http_code(allowed.clone());

        match case["expected_kind"].as_str() {
            None => assert!(result.is_ok(), "{name}: expected pass"),
            Some(expected_kind) => {
                let err = result.unwrap_err();
                let status = err.status().unwrap_or_else(|| panic!("{name}: not a status error"));
                assert_eq!(kind_name(&status.kind), expected_kind, "{name}: kind");
                assert_eq!(status.http_code(), http_code, "{name}: code");
                assert_eq!(
                    err.to_string(),
                    case["expected_message"].as_str().unwrap(),
                    "{name}: message"
                );
                if let StatusKind::UnexpectedHttpCode { allowed: carried } = &status.kind {
                    assert_eq!(carried, &allowed.to_vec(), "{name}: allowed codes");
                }
            }
        }
    }
}

fn query_value(value: &Value) -> QueryValue {
    match value {
        Value::Array(items) => {
            QueryValue::List(items.iter().map(|v| v.as_str().unwrap().to_string()).collect())
        }
        other => QueryValue::from(other.as_str().unwrap()),
    }
}

#[test]
fn query_vectors() {
    for case in cases(include_str!("../../test-vectors/query.json")) {
        let name = case["name"].as_str().unwrap();
        let params = case["params"].as_array().map(|pairs| {
            pairs
                .iter()
                .map(|pair| (pair[0].as_str().unwrap(), query_value(&pair[1])))
                .collect::<QueryParams>()
        });

        let mut request = HttpRequest::new(case["url"].as_str().unwrap());
        request.set_query(params);
        assert_eq!(request.url(), case["expected"].as_str().unwrap(), "{name}");
    }
}

fn configure<F: Flavor>(request: &mut Request<F>, case: &Value) {
    let lines: Vec<&str> = case["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    request.set_headers(lines.into_iter().collect::<simple_http::HeaderLines>());

    // "default" keeps the flavor's value, null clears it
    match case["accept"].as_str() {
        Some("default") => {}
        accept => {
            request.set_accept(accept);
        }
    }
    match case["content_type"].as_str() {
        Some("default") => {}
        content_type => {
            request.set_content_type(content_type);
        }
    }
    match case["body"].as_str() {
        Some("json") => {
            request.set_json_body(serde_json::json!({"test": true}));
        }
        Some("form") => {
            request.set_body(UrlencodedBody::new([("a", "1")]));
        }
        Some("raw") => {
            request.set_body("raw");
        }
        Some("none") => {
            request.set_body(NoBody);
        }
        Some(other) => panic!("unknown body kind: {other}"),
        None => {}
    }
}

#[test]
fn header_vectors() {
    for case in cases(include_str!("../../test-vectors/headers.json")) {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());
        let expected: Vec<String> = case["expected"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l.as_str().unwrap().to_string())
            .collect();

        let headers = match case["flavor"].as_str().unwrap() {
            "plain" => {
                let mut request = HttpRequest::with_method("https://example.com", method);
                configure(&mut request, &case);
                request.headers()
            }
            "json" => {
                let mut request = JsonHttpRequest::with_method("https://example.com", method);
                configure(&mut request, &case);
                request.headers()
            }
            other => panic!("unknown flavor: {other}"),
        };
        assert_eq!(headers, expected, "{name}");
    }
}
