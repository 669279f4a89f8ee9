use crate::platform::LoginResponse;
use anyhow::Result;
use chrono::DateTime;
use console::Emoji;

const LOCK: Emoji = Emoji("🔒 ", "");

const KEYRING_SERVICE: &str = "coderun-cli";
const KEYRING_USER: &str = "auth_session";

pub const API_URL_ENV: &str = "CODERUN_API_URL";

#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthSession {
    pub email: String,
    access_token: String,
    pub token_type: String,
    pub logged_in_at: DateTime<chrono::Utc>,
}

impl AuthSession {
    fn keyring_credential() -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
    }

    fn init() -> Option<Self> {
        AuthSession::keyring_credential().ok().and_then(|entry| {
            entry
                .get_password()
                .ok()
                .and_then(|password| serde_json::from_str(&password).ok())
        })
    }

    fn save(&self) -> Result<()> {
        let serialized = serde_json::to_string(self)?;
        AuthSession::keyring_credential()?.set_password(&serialized)?;
        log::debug!("Auth session saved to keyring");
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        AuthSession::keyring_credential()?.delete_credential()?;
        log::debug!("Auth session deleted from keyring");
        Ok(())
    }
}

/// Process-wide settings, loaded once in `main` and read-only for the rest of
/// a command (login and logout are the only writers).
pub struct CliConfig {
    api_host: String,
    use_https: bool,

    auth_session: Option<AuthSession>,
}

const DEFAULT_API_URL: &str = if cfg!(debug_assertions) {
    "http://localhost:8000"
} else {
    "https://api.coderun.dev"
};

impl CliConfig {
    pub fn init() -> Self {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = CliConfig::with_api_url(&api_url);
        config.auth_session = AuthSession::init();
        config
    }

    /// A config without a stored session, pointed at `api_url`.
    pub fn with_api_url(api_url: &str) -> Self {
        let (api_host, use_https) = if let Some(host) = api_url.strip_prefix("http://") {
            (host, false)
        } else if let Some(host) = api_url.strip_prefix("https://") {
            (host, true)
        } else {
            (api_url, true)
        };
        let api_host = api_host.trim_end_matches('/').to_string();
        log::debug!("Using API host: {api_host}");

        CliConfig {
            api_host,
            use_https,
            auth_session: None,
        }
    }

    pub fn url(&self, path: &str) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.api_host, path)
    }

    pub fn ensure_auth(&self) -> Result<()> {
        if self.auth_session.is_none() {
            let program = std::env::args().nth(0).unwrap_or("<program>".to_string());
            let login_command = console::style(format!("{program} login")).bold();
            return Err(anyhow::anyhow!(
                "{}Please login first using {}.",
                LOCK,
                login_command
            ));
        }
        Ok(())
    }

    pub fn save_auth_from_login(&mut self, email: &str, response: LoginResponse) -> Result<()> {
        let auth_session = AuthSession {
            email: email.to_string(),
            access_token: response.access_token,
            token_type: response.token_type,
            logged_in_at: chrono::Utc::now(),
        };
        auth_session.save()?;
        self.auth_session = Some(auth_session);
        Ok(())
    }

    /// Removes the stored session. Returns whether there was one.
    pub fn clear_auth(&mut self) -> Result<bool> {
        match self.auth_session.take() {
            Some(session) => {
                session.delete()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn token(&self) -> Result<String> {
        self.ensure_auth()?;
        self.auth_session
            .as_ref()
            .map(|session| session.access_token.clone())
            .ok_or_else(|| anyhow::anyhow!("No authentication session found"))
    }

    pub fn auth_session(&self) -> Option<&AuthSession> {
        self.auth_session.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_scheme_and_strips_trailing_slash() {
        let config = CliConfig::with_api_url("http://localhost:8000/");
        assert_eq!(config.url("/api/v1/deploy"), "http://localhost:8000/api/v1/deploy");

        let config = CliConfig::with_api_url("api.example.com");
        assert_eq!(config.url("/x"), "https://api.example.com/x");
    }

    #[test]
    fn token_requires_session() {
        let config = CliConfig::with_api_url("https://api.example.com");
        assert!(config.token().is_err());
        assert!(config.auth_session().is_none());
    }
}
