use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::transport::TransportClient;
use crate::types::{Credentials, CurrentUser, Id, Registration};

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawLogin {
    access_token: String,
    id: Id,
    username: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

/// Login, registration and logout against the tracker service.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: TransportClient,
}

impl AuthService {
    pub fn new(client: TransportClient) -> Self {
        Self { client }
    }

    /// Authenticate and start a session. Returns the logged-in user.
    pub async fn login(&self, credentials: &Credentials) -> Result<CurrentUser> {
        let body = LoginBody {
            username: &credentials.username,
            password: &credentials.password,
        };
        let resp = self
            .client
            .post("/auth/login", Some(&body))
            .await?
            .error_for_status("Login failed", None)?;
        let raw: RawLogin = resp.json()?;
        let user = CurrentUser {
            id: raw.id,
            username: raw.username,
            first_name: raw.first_name.unwrap_or_default(),
            last_name: raw.last_name.unwrap_or_default(),
        };
        self.client
            .session()
            .establish(raw.access_token, user.clone())?;
        Ok(user)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        if registration.password != registration.confirm_password {
            return Err(ClientError::Validation {
                status: 422,
                message: "Passwords do not match".to_owned(),
            });
        }
        let body = RegisterBody {
            first_name: &registration.first_name,
            last_name: &registration.last_name,
            password: &registration.password,
            confirm_password: &registration.confirm_password,
        };
        self.client
            .post("/auth/register", Some(&body))
            .await?
            .error_for_status("Registration failed", None)?;
        tracing::info!("auth: registered {} {}", registration.first_name, registration.last_name);
        Ok(())
    }

    /// End the session locally. The service keeps no server-side session.
    pub fn logout(&self) -> Result<()> {
        self.client.session().clear()
    }
}
