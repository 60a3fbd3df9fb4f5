use reqwest::{header, multipart::Form, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::{ClientError, SessionStore};

/// The one request pipeline every service goes through.
///
/// Attaches `Authorization: Bearer <token>` while a session is held, sends
/// JSON unless the body is multipart, and turns non-2xx responses into
/// [`ClientError`]s. A 401 ends the session whose token the request carried.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Client for the API served next to the page, at `<origin>/api`.
    #[cfg(target_arch = "wasm32")]
    pub fn from_window(session: SessionStore) -> Self {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        Self::new(format!("{origin}/api"), session)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let token = self.session.token();
        let builder = self
            .builder(Method::GET, path, token.as_deref(), &Body::Empty)
            .query(query);
        self.send(path, builder, Body::Empty, token.as_deref()).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let json = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.call(Method::POST, path, Body::Json(json)).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        self.call(Method::POST, path, Body::Multipart(form)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::DELETE, path, Body::Empty).await
    }

    /// POSTs on behalf of a token that is no longer in the session.
    pub(crate) async fn post_as<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ClientError> {
        let body = Body::Json(serde_json::json!({}));
        let builder = self.builder(Method::POST, path, Some(token), &body);
        self.send(path, builder, body, None).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<T, ClientError> {
        let token = self.session.token();
        let builder = self.builder(method, path, token.as_deref(), &body);
        self.send(path, builder, body, token.as_deref()).await
    }

    fn builder(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &Body,
    ) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self.http.request(method, url).header(header::ACCEPT, "application/json");
        // Multipart sets its own content type with the boundary.
        if !matches!(body, Body::Multipart(_)) {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
        body: Body,
        session_token: Option<&str>,
    ) -> Result<T, ClientError> {
        let builder = match body {
            Body::Empty => builder,
            Body::Json(json) => builder.json(&json),
            Body::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            error!("request to {path} failed: {e}");
            ClientError::Transport(e.to_string())
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("reading response from {path} failed: {e}");
            ClientError::Transport(e.to_string())
        })?;

        if status.is_success() {
            debug!("{path} -> {status}");
            return serde_json::from_str(&text).map_err(|e| {
                error!("unexpected response body from {path}: {e}");
                ClientError::Decode(e.to_string())
            });
        }

        let err = ClientError::from_response(status.as_u16(), &text);
        if !matches!(err, ClientError::Validation(_)) {
            error!("{path} -> {status}: {err}");
        }
        // A newer login may have replaced the token while this was in flight.
        if status == reqwest::StatusCode::UNAUTHORIZED {
            if let Some(token) = session_token {
                self.session.clear_if_token(token);
            }
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{test_user, Session};
    use pretty_assertions::assert_eq;
    use roster_types::{Gender, GendersEnvelope};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn logged_in_client(server: &MockServer) -> ApiClient {
        let session = SessionStore::in_memory();
        session.set(Session {
            token: "secret".into(),
            user: test_user(1),
        });
        ApiClient::new(format!("{}/api/", server.uri()), session)
    }

    #[tokio::test]
    async fn attaches_bearer_token_and_json_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/fetchGenders"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "genders": [{"id": 1, "gender": "Male"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = logged_in_client(&server).await;
        let body: GendersEnvelope = client.get("fetchGenders", &[]).await.unwrap();
        assert_eq!(
            body.genders,
            vec![Gender {
                id: 1,
                gender: "Male".into()
            }]
        );
    }

    #[tokio::test]
    async fn unauthorized_response_clears_the_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/fetchRoles"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Unauthenticated."})),
            )
            .mount(&server)
            .await;

        let client = logged_in_client(&server).await;
        let err = client.get::<serde_json::Value>("fetchRoles", &[]).await.unwrap_err();

        assert_eq!(err, ClientError::Unauthorized("Unauthenticated.".into()));
        assert!(!client.session().is_logged_in());
    }

    #[tokio::test]
    async fn late_401_for_a_replaced_token_keeps_the_new_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/fetchRoles"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Unauthenticated."}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let client = logged_in_client(&server).await;
        let relogin = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.session().set(Session {
                token: "fresh".into(),
                user: test_user(2),
            });
        };
        let fetch = client.get::<serde_json::Value>("fetchRoles", &[]);
        let (result, ()) = tokio::join!(fetch, relogin);

        assert!(matches!(result, Err(ClientError::Unauthorized(_))));
        assert_eq!(client.session().token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn garbage_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = logged_in_client(&server).await;
        let err = client.delete::<serde_json::Value>("user/delete/3").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert!(client.session().is_logged_in());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:9/api", SessionStore::in_memory());
        let err = client.get::<serde_json::Value>("fetchUsers", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
