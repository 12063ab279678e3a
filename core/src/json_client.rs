//! Convenience facade for JSON APIs.
//!
//! Every call builds a `JsonHttpRequest` from the client defaults, executes it
//! and checks the status against the allowed codes. The plain methods return
//! the decoded body; the `*_ex` methods return the response itself.

use serde::Serialize;
use serde_json::Value;

use crate::body::JsonBody;
use crate::client::HttpClient;
use crate::error::Result;
use crate::http::{
    AllowedCodes, ExpectedContentType, HeaderKey, HeaderLines, HttpMethod, QueryParams,
    APPLICATION_JSON,
};
use crate::request::JsonHttpRequest;
use crate::response::JsonHttpResponse;

#[derive(Debug, Clone)]
pub struct JsonClient<C> {
    client: C,
    allowed_codes: Option<AllowedCodes>,
    expected_content_type: Option<ExpectedContentType>,
    headers: HeaderLines,
    request_accept: Option<String>,
    request_content_type: Option<String>,
    response_headers_required: Option<bool>,
}

impl<C: HttpClient> JsonClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            allowed_codes: Some(AllowedCodes::default()),
            expected_content_type: Some(ExpectedContentType::json()),
            headers: HeaderLines::new(),
            request_accept: Some(APPLICATION_JSON.to_string()),
            request_content_type: Some(APPLICATION_JSON.to_string()),
            response_headers_required: None,
        }
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    /// `None` skips the status check.
    pub fn set_allowed_codes(&mut self, allowed: Option<AllowedCodes>) -> &mut Self {
        self.allowed_codes = allowed;
        self
    }

    /// `None` skips the content-type check.
    pub fn set_expected_content_type(
        &mut self,
        expected: Option<ExpectedContentType>,
    ) -> &mut Self {
        self.expected_content_type = expected;
        self
    }

    pub fn add_header(&mut self, line: impl Into<String>) -> &mut Self {
        self.headers.add(line);
        self
    }

    /// Set or (with `None`) remove the line stored under `key`.
    pub fn set_header(&mut self, key: impl Into<HeaderKey>, line: Option<&str>) -> &mut Self {
        match line {
            Some(line) => {
                self.headers.set(key, line);
            }
            None => {
                self.headers.remove(key);
            }
        }
        self
    }

    pub fn set_headers(&mut self, headers: impl Into<HeaderLines>) -> &mut Self {
        self.headers = headers.into();
        self
    }

    pub fn set_request_accept(&mut self, accept: Option<&str>) -> &mut Self {
        self.request_accept = accept.map(str::to_string);
        self
    }

    pub fn set_request_content_type(&mut self, content_type: Option<&str>) -> &mut Self {
        self.request_content_type = content_type.map(str::to_string);
        self
    }

    pub fn set_response_headers_required(&mut self, required: Option<bool>) -> &mut Self {
        self.response_headers_required = required;
        self
    }

    /// Request carrying the client defaults, for callers that need to adjust
    /// it before [`send`](Self::send).
    pub fn build(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        query: Option<QueryParams>,
    ) -> JsonHttpRequest {
        let mut request = JsonHttpRequest::with_method(url, method);
        request
            .set_query(query)
            .set_headers(self.headers.clone())
            .set_accept(self.request_accept.as_deref())
            .set_expected_content_type(self.expected_content_type.clone())
            .set_response_headers_required(self.response_headers_required);
        request
    }

    /// Execute a request and check its status.
    pub fn send(&self, request: JsonHttpRequest) -> Result<JsonHttpResponse> {
        let response = self.client.request(request)?;
        if let Some(allowed) = &self.allowed_codes {
            response.check_http_code(allowed.clone())?;
        }
        Ok(response)
    }

    pub fn get(&self, url: impl Into<String>, query: Option<QueryParams>) -> Result<Value> {
        self.get_ex(url, query)?.data()
    }

    pub fn get_ex(
        &self,
        url: impl Into<String>,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse> {
        self.send(self.build(HttpMethod::Get, url, query))
    }

    pub fn delete(&self, url: impl Into<String>, query: Option<QueryParams>) -> Result<Value> {
        self.delete_ex(url, query)?.data()
    }

    pub fn delete_ex(
        &self,
        url: impl Into<String>,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse> {
        self.send(self.build(HttpMethod::Delete, url, query))
    }

    pub fn post<T>(&self, url: impl Into<String>, data: T, query: Option<QueryParams>) -> Result<Value>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.post_ex(url, data, query)?.data()
    }

    pub fn post_ex<T>(
        &self,
        url: impl Into<String>,
        data: T,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.send_json(HttpMethod::Post, url, data, query)
    }

    pub fn put<T>(&self, url: impl Into<String>, data: T, query: Option<QueryParams>) -> Result<Value>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.put_ex(url, data, query)?.data()
    }

    pub fn put_ex<T>(
        &self,
        url: impl Into<String>,
        data: T,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.send_json(HttpMethod::Put, url, data, query)
    }

    pub fn patch<T>(&self, url: impl Into<String>, data: T, query: Option<QueryParams>) -> Result<Value>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.patch_ex(url, data, query)?.data()
    }

    pub fn patch_ex<T>(
        &self,
        url: impl Into<String>,
        data: T,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse>
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.send_json(HttpMethod::Patch, url, data, query)
    }

    fn send_json<T>(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        data: T,
        query: Option<QueryParams>,
    ) -> Result<JsonHttpResponse>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let mut request = self.build(method, url, query);
        request.set_body(JsonBody::new(data).with_content_type(self.request_content_type.as_deref()));
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;

    use super::*;
    use crate::error::{Error, StatusKind};
    use crate::request::{Flavor, Request};
    use crate::response::{Response, ResponseParts};

    const URL: &str = "https://example.com";

    /// Answers with `[method, url, headers, body]` as JSON.
    struct Echo {
        http_code: u16,
        content_type: Option<&'static str>,
    }

    impl Echo {
        fn ok() -> Self {
            Self::with(200, Some("application/json"))
        }

        fn with(http_code: u16, content_type: Option<&'static str>) -> Self {
            Self {
                http_code,
                content_type,
            }
        }
    }

    impl HttpClient for Echo {
        fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
            let body = request.body()?;
            let echoed = json!([request.method().as_str(), request.url(), request.headers(), body]);
            let mut parts = ResponseParts::new(self.http_code, request.url()).body(echoed.to_string());
            parts.content_type = self.content_type.map(str::to_string);
            Ok(request.make_response(parts))
        }
    }

    fn accept() -> String {
        format!("Accept: {APPLICATION_JSON}")
    }

    #[test]
    fn get_and_delete_send_query_without_body() {
        let mut client = JsonClient::new(Echo::ok());
        client.add_header("X-H: Test");
        let query = || Some(QueryParams::from([("param1", 1)]));

        assert_eq!(
            client.get(URL, query()).unwrap(),
            json!(["GET", "https://example.com?param1=1", ["X-H: Test", accept()], null])
        );
        assert_eq!(
            client.delete(URL, query()).unwrap(),
            json!(["DELETE", "https://example.com?param1=1", ["X-H: Test", accept()], null])
        );
    }

    #[test]
    fn body_methods_send_json() {
        let client = JsonClient::new(Echo::ok());
        let content_type = format!("Content-Type: {APPLICATION_JSON}");
        for (method, value) in [
            ("POST", client.post(URL, json!({"test": true}), None)),
            ("PUT", client.put(URL, json!({"test": true}), None)),
            ("PATCH", client.patch(URL, json!({"test": true}), None)),
        ] {
            assert_eq!(
                value.unwrap(),
                json!([method, URL, [accept(), content_type.clone()], r#"{"test":true}"#])
            );
        }
    }

    #[test]
    fn request_content_type_can_be_dropped() {
        let mut client = JsonClient::new(Echo::ok());
        client.set_request_content_type(None).set_request_accept(None);
        assert_eq!(
            client.post(URL, json!([1]), None).unwrap(),
            json!(["POST", URL, [], "[1]"])
        );
    }

    #[test]
    fn header_slots() {
        let mut client = JsonClient::new(Echo::ok());
        client.set_header("X-H", Some("X-H: Test")).set_header("X-H", Some("X-H: Test"));
        assert_eq!(client.get(URL, None).unwrap()[2], json!(["X-H: Test", accept()]));

        client.set_header("X-H", None);
        client.add_header("X-A: 1").set_header(0usize, None);
        assert_eq!(client.get(URL, None).unwrap()[2], json!([accept()]));

        client.set_headers(["", "X-H: Test"]);
        assert_eq!(client.get(URL, None).unwrap()[2], json!(["X-H: Test", accept()]));
    }

    #[test]
    fn status_is_checked() {
        let client = JsonClient::new(Echo::with(404, Some("application/json")));
        let err = client.get(URL, None).unwrap_err();
        assert_eq!(err.status().unwrap().kind, StatusKind::NotFound);
        assert_eq!(err.to_string(), "Not Found.");

        let mut client = JsonClient::new(Echo::ok());
        client.set_allowed_codes(Some([201, 202].into()));
        let err = client.get(URL, None).unwrap_err();
        assert_eq!(err.to_string(), "Expected http codes [201,202], but received http code 200.");

        client.set_allowed_codes(Some(Vec::new().into()));
        let err = client.get(URL, None).unwrap_err();
        assert_eq!(err.to_string(), "Expected http codes [], but received http code 200.");

        client.set_allowed_codes(None);
        client.get(URL, None).unwrap();

        let mut client = JsonClient::new(Echo::with(201, Some("application/json")));
        client.set_allowed_codes(Some(201.into()));
        client.get(URL, None).unwrap();
    }

    #[test]
    fn content_type_is_checked() {
        let client = JsonClient::new(Echo::with(200, Some("text/html")));
        assert!(matches!(
            client.get(URL, None),
            Err(Error::UnexpectedContentType { .. })
        ));

        let client = JsonClient::new(Echo::with(200, None));
        assert!(client.get(URL, None).is_err());

        let mut client = JsonClient::new(Echo::with(200, None));
        client.set_expected_content_type(None);
        client.get(URL, None).unwrap();
        client.set_expected_content_type(Some(vec![Some("application/json".to_string()), None].into()));
        client.get(URL, None).unwrap();

        let mut client = JsonClient::new(Echo::with(200, Some("application/json; test")));
        client.set_expected_content_type(Some("application/json; test".into()));
        client.get(URL, None).unwrap();
    }

    #[test]
    fn unencodable_body_fails_before_dispatch() {
        struct Cyclic;
        impl Serialize for Cyclic {
            fn serialize<S: Serializer>(&self, _s: S) -> std::result::Result<S::Ok, S::Error> {
                Err(S::Error::custom("Recursion detected"))
            }
        }

        let client = JsonClient::new(Echo::ok());
        match client.post(URL, Cyclic, None).unwrap_err() {
            Error::JsonEncode { data, source } => {
                assert!(data.downcast_ref::<Cyclic>().is_some());
                assert!(source.to_string().contains("Recursion detected"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ex_variant_returns_response() {
        let client = JsonClient::new(Echo::ok());
        let response = client.get_ex(URL, None).unwrap();
        assert_eq!(response.http_code(), 200);
        assert_eq!(response.request().method(), HttpMethod::Get);
    }

    #[test]
    fn build_then_send_allows_per_call_changes() {
        let client = JsonClient::new(Echo::ok());
        let mut request = client.build(HttpMethod::Get, URL, None);
        request.add_header("X-Once: 1");
        let response = client.send(request).unwrap();
        assert_eq!(response.data().unwrap()[2], json!(["X-Once: 1", accept()]));
    }
}
