//! NumberPlay HTTP client with bearer-token authentication

use numberplay_core::{
    AuthResponse, CurrentUser, Error, GamePlayRequest, GamePlayResponse, GameRecord,
    LoginRequest, PlayNumber, RegisterRequest, Result, UserStatistics,
};
use numberplay_persistence::SessionContext;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, Response, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT_VALUE: &str = concat!("numberplay-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the NumberPlay REST API
///
/// Reads the bearer token from the shared [`SessionContext`] on every
/// request, so a login elsewhere is picked up without rebuilding the client.
#[derive(Clone)]
pub struct NumberPlayClient {
    http: Client,
    base_url: Url,
    session: SessionContext,
}

impl NumberPlayClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str, session: SessionContext) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidData(format!("Invalid API base URL {}: {}", base_url, e)))?;

        let http = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| Error::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidData(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Headers for authenticated requests. Fails if nobody is logged in.
    async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.session.token().await?.ok_or(Error::AuthenticationMissing)?;
        let mut headers = Self::default_headers();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::InvalidData(format!("Token is not a valid header: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status() {
            StatusCode::UNAUTHORIZED => Some(Error::TokenExpired),
            StatusCode::FORBIDDEN => Some(Error::AuthenticationError("Access forbidden".to_string())),
            _ => None,
        }
    }

    /// Map a response to `T`, turning error statuses into typed errors
    async fn parse_response<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("{} request rate limited", what);
            return Err(Error::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!("{} request failed: HTTP {} - {}", what, status, body);
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(if status == StatusCode::BAD_REQUEST {
                Error::ValidationError(message)
            } else {
                Error::ApiError(message)
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", what, e);
            Error::InvalidData(e.to_string())
        })
    }

    /// Log in and store the returned access token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = self.endpoint("/auth/api/login/")?;
        debug!("Logging in via {}", url);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(url)
            .headers(Self::default_headers())
            .json(&request)
            .send()
            .await?;

        let auth: AuthResponse = Self::parse_response(response, "Login").await?;
        self.session.store_token(&auth.access_token).await?;

        info!("Logged in as {}", auth.user.username);
        Ok(auth)
    }

    /// Create an account and store the returned access token
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let url = self.endpoint("/auth/api/register/")?;
        debug!("Registering via {}", url);

        let response = self
            .http
            .post(url)
            .headers(Self::default_headers())
            .json(request)
            .send()
            .await?;

        let auth: AuthResponse = Self::parse_response(response, "Register").await?;
        self.session.store_token(&auth.access_token).await?;

        info!("Registered and logged in as {}", auth.user.username);
        Ok(auth)
    }

    /// Fetch the user behind the stored token
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<CurrentUser> {
        let url = self.endpoint("/auth/api/user/")?;
        let response = self
            .http
            .get(url)
            .headers(self.auth_headers().await?)
            .send()
            .await?;

        Self::parse_response(response, "Current user").await
    }

    /// Whether the stored token is accepted by the server.
    ///
    /// No token means `false` without touching the network; a rejected
    /// token also means `false`. Anything else that goes wrong is an error.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> Result<bool> {
        if self.session.token().await?.is_none() {
            debug!("No stored token, not authenticated");
            return Ok(false);
        }

        match self.get_current_user().await {
            Ok(user) => {
                debug!("Authenticated as {}", user.username);
                Ok(true)
            }
            Err(Error::TokenExpired) | Err(Error::AuthenticationError(_)) => {
                info!("Stored token was rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Submit a number
    #[instrument(skip(self))]
    pub async fn play_game(&self, number: PlayNumber) -> Result<GamePlayResponse> {
        let url = self.endpoint("/api/game/play/")?;
        debug!("Playing number {}", number);

        let response = self
            .http
            .post(url)
            .headers(self.auth_headers().await?)
            .json(&GamePlayRequest { number })
            .send()
            .await?;

        let outcome: GamePlayResponse = Self::parse_response(response, "Play").await?;
        debug!("Played {}: {:?} prize {:?}", outcome.number, outcome.result, outcome.prize);
        Ok(outcome)
    }

    /// Most recent games, newest first
    #[instrument(skip(self))]
    pub async fn get_game_history(&self) -> Result<Vec<GameRecord>> {
        let url = self.endpoint("/api/game/history/")?;

        let response = self
            .http
            .get(url)
            .headers(self.auth_headers().await?)
            .send()
            .await?;

        let history: Vec<GameRecord> = Self::parse_response(response, "History").await?;
        debug!("Fetched {} history entries", history.len());
        Ok(history)
    }

    /// Aggregate statistics for the current user
    #[instrument(skip(self))]
    pub async fn get_user_statistics(&self) -> Result<UserStatistics> {
        let url = self.endpoint("/api/game/statistics/")?;

        let response = self
            .http
            .get(url)
            .headers(self.auth_headers().await?)
            .send()
            .await?;

        let stats: UserStatistics = Self::parse_response(response, "Statistics").await?;
        debug!(
            "Statistics fetched: {} games, {}% win rate",
            stats.total_games, stats.win_rate
        );
        Ok(stats)
    }

    /// Forget the stored token. The server keeps no session to end.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await?;
        info!("Logged out");
        Ok(())
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, `{"error": "..."}`, and field error maps
/// like `{"number": ["Number cannot exceed 9999."]}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            let trimmed = body.trim();
            return (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect());
        }
    };

    fn first_string(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => items.iter().find_map(first_string),
            serde_json::Value::Object(map) => map.values().find_map(first_string),
            _ => None,
        }
    }

    let object = value.as_object()?;
    for key in ["detail", "error", "message", "non_field_errors"] {
        if let Some(msg) = object.get(key).and_then(first_string) {
            return Some(msg);
        }
    }
    first_string(&value)
}
