//! Authenticated request building.
//!
//! Every protected API call goes through [`ApiRequest`]: it checks the
//! stored credential, refreshes it when near expiry (sharing the
//! session's single-flight refresh), then forwards the request with a
//! bearer header, JSON content type, and the ambient cookie jar.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionManager;

/// Error body shape used by the API (`{"error": "<message>"}`).
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// A request descriptor bound to a session.
pub struct ApiRequest<'a> {
    session: &'a SessionManager,
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    allow_anonymous: bool,
}

impl SessionManager {
    /// Start building a request against an API path.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest<'_> {
        ApiRequest {
            session: self,
            method,
            path: path.to_string(),
            body: None,
            allow_anonymous: false,
        }
    }
}

impl ApiRequest<'_> {
    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Skip the credential check for endpoints that accept anonymous
    /// callers. No bearer header is attached and no refresh happens.
    pub fn allow_anonymous(mut self) -> Self {
        self.allow_anonymous = true;
        self
    }

    /// Send the request, refreshing the credential first if needed.
    ///
    /// When no usable credential can be obtained the session transitions
    /// to anonymous and the request fails with
    /// [`ClientError::Unauthorized`].
    pub async fn send(self) -> ClientResult<Response> {
        let token = if self.allow_anonymous {
            None
        } else {
            match self.session.fresh_token().await {
                Ok(token) => Some(token),
                Err(ClientError::Unauthorized(message)) => {
                    self.session.logout().await;
                    return Err(ClientError::Unauthorized(message));
                }
                Err(e) => return Err(e),
            }
        };

        let url = self.session.config.endpoint(&self.path)?;
        let mut builder = self
            .session
            .http
            .request(self.method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.raw()));
        }
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Send and decode a JSON response, mapping non-success statuses to
    /// [`ClientError::Api`] / [`ClientError::Unauthorized`].
    pub async fn send_json<T: DeserializeOwned>(self) -> ClientResult<T> {
        let response = self.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Send and discard the response body, checking only the status.
    pub async fn send_expect_success(self) -> ClientResult<()> {
        let response = self.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

/// Map a non-success response into a client error, using the API's error
/// body when it parses.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    if status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized(message)
    } else {
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
