use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum APIErrorVariant {
    Network,
    MalformedResponse,
    BadClientData,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    BadGateway,
    ServiceUnavailable,
    InternalError,
    UnexpectedStatusCode,
}

#[derive(Debug, Clone)]
pub struct APIError {
    pub variant: APIErrorVariant,
    /// Status code of the response, when one was received
    pub status: Option<StatusCode>,
    pub message: String,
}

pub type APIResponse<T> = Result<T, APIError>;

/// Talks to the `/api/v1` scope of the server
pub(crate) struct BaseClient {
    client: Client,
    address: String,
    token: Option<String>,
    headers: Vec<(String, String)>,
}

fn variant_for(status: StatusCode) -> APIErrorVariant {
    match status {
        StatusCode::BAD_REQUEST => APIErrorVariant::BadClientData,
        StatusCode::UNAUTHORIZED => APIErrorVariant::Unauthorized,
        StatusCode::FORBIDDEN => APIErrorVariant::Forbidden,
        StatusCode::NOT_FOUND => APIErrorVariant::NotFound,
        StatusCode::CONFLICT => APIErrorVariant::Conflict,
        StatusCode::BAD_GATEWAY => APIErrorVariant::BadGateway,
        StatusCode::SERVICE_UNAVAILABLE => APIErrorVariant::ServiceUnavailable,
        StatusCode::INTERNAL_SERVER_ERROR => APIErrorVariant::InternalError,
        _ => APIErrorVariant::UnexpectedStatusCode,
    }
}

impl BaseClient {
    pub fn new(address: String) -> Self {
        let address = format!("{}/api/v1", address.trim_end_matches('/'));
        Self {
            client: Client::new(),
            address,
            token: None,
            headers: Vec::new(),
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn set_header(&mut self, name: String, value: String) {
        self.headers.push((name, value));
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, &format!("{}/{}", self.address, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        for (name, value) in &self.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = req.send().await.map_err(|e| APIError {
            variant: APIErrorVariant::Network,
            status: None,
            message: e.to_string(),
        })?;

        let status = res.status();
        if status != expected_status_code {
            let message = res.text().await.unwrap_or_default();
            return Err(APIError {
                variant: variant_for(status),
                status: Some(status),
                message,
            });
        }

        res.json::<T>().await.map_err(|e| APIError {
            variant: APIErrorVariant::MalformedResponse,
            status: Some(status),
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.request(Method::GET, &path);
        self.handle_response(req, expected_status_code).await
    }

    pub async fn post<T: DeserializeOwned, S: Serialize>(
        &self,
        body: S,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.request(Method::POST, &path).json(&body);
        self.handle_response(req, expected_status_code).await
    }

    /// Posts the body as is, with extra headers for this request only
    pub async fn post_raw<T: DeserializeOwned>(
        &self,
        body: Vec<u8>,
        headers: &[(&str, &str)],
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let mut req = self
            .request(Method::POST, &path)
            .header("content-type", "application/json")
            .body(body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        self.handle_response(req, expected_status_code).await
    }

    pub async fn put<T: DeserializeOwned, S: Serialize>(
        &self,
        body: S,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let req = self.request(Method::PUT, &path).json(&body);
        self.handle_response(req, expected_status_code).await
    }
}
