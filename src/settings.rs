use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::identity::ClientCredential;
use crate::utils::crypto::generate_nonce;

/// Default Azure AD authority host
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default callback path registered with the app registration
pub const DEFAULT_REDIRECT_PATH: &str = "/getAToken";

/// Longest session lifetime accepted at startup (one year)
pub const MAX_SESSION_DURATION_HOURS: u64 = 8760;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub application: ApplicationSettings,
    pub identity: IdentitySettings,
    pub static_files: StaticFilesSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL, used to build the callback URL
    pub redirect_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub client_id: String,
    pub tenant_id: String,
    pub authority_host: String,
    /// Full authority URL. Takes precedence over `authority_host` + `tenant_id`.
    pub authority: Option<String>,
    pub client_secret: Option<String>,
    /// Path to a federated token (e.g. workload identity) used as client assertion
    pub client_assertion_file: Option<String>,
    pub redirect_path: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
    pub assets_folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub session_secret: String,
    pub session_duration_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            tenant_id: String::new(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            authority: None,
            client_secret: None,
            client_assertion_file: None,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            scopes: vec!["User.Read".to_string()],
        }
    }
}

impl Default for StaticFilesSettings {
    fn default() -> Self {
        Self {
            assets_folder: "static".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_secret: String::new(), // Will be generated if empty
            session_duration_hours: 24,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - A settings file cannot be read or parsed
    /// - The identity configuration is incomplete
    pub fn load() -> Result<Self> {
        Self::initialize_environment()?;

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        settings.validate()?;

        Ok(settings)
    }

    /// Load `.env` and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<()> {
        Self::load_env_file();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `ENTRAGATE_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml(&fs::read_to_string(&default_config_path)?)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("ENTRAGATE_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml(&fs::read_to_string(&secrets_path)?)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ ENTRAGATE_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse settings from TOML text; missing sections and keys take defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(basic_toml::from_str(content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_static_files_env_overrides(&mut settings.static_files);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
    }

    /// Apply environment overrides for identity settings
    pub fn apply_identity_env_overrides(identity: &mut IdentitySettings) {
        if let Ok(client_id) = std::env::var("AZURE_CLIENT_ID") {
            identity.client_id = client_id;
        }
        if let Ok(tenant_id) = std::env::var("AZURE_TENANT_ID") {
            identity.tenant_id = tenant_id;
        }
        if let Ok(authority_host) = std::env::var("AZURE_AUTHORITY_HOST") {
            identity.authority_host = authority_host;
        }
        Self::apply_optional_env_override("AZURE_AUTHORITY", &mut identity.authority);
        Self::apply_optional_env_override("AZURE_CLIENT_SECRET", &mut identity.client_secret);
        Self::apply_optional_env_override(
            "AZURE_FEDERATED_TOKEN_FILE",
            &mut identity.client_assertion_file,
        );
        if let Ok(redirect_path) = std::env::var("REDIRECT_PATH") {
            identity.redirect_path = redirect_path;
        }
        if let Ok(scopes) = std::env::var("SCOPES") {
            let scopes: Vec<String> = scopes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            if !scopes.is_empty() {
                identity.scopes = scopes;
            }
        }
    }

    fn apply_optional_env_override(env_var: &str, target: &mut Option<String>) {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                *target = Some(value);
            }
        }
    }

    fn apply_static_files_env_overrides(static_settings: &mut StaticFilesSettings) {
        if let Ok(assets_folder) = std::env::var("STATIC_FOLDER_PATH") {
            static_settings.assets_folder = assets_folder;
        }
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(value) = std::env::var("SESSION_DURATION_HOURS") {
            if let Ok(hours) = value.parse::<u64>() {
                session_settings.session_duration_hours = hours;
            }
        }

        Self::handle_session_secret_override(session_settings);
    }

    /// Take `SESSION_SECRET` if set, otherwise generate a secret when none is configured
    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = generate_nonce(32);
            Self::warn_about_generated_secret();
        }
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 All sessions are invalidated on restart unless a secret is configured");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Check that the identity configuration can be used to sign users in
    ///
    /// # Errors
    ///
    /// Returns an error if the client ID, the authority or the client credential
    /// is missing, or the session duration is out of range
    pub fn validate(&self) -> Result<()> {
        if self.identity.client_id.is_empty() {
            bail!(
                "Azure AD client_id not configured. Set AZURE_CLIENT_ID or [identity].client_id"
            );
        }
        if self.identity.authority.is_none() && self.identity.tenant_id.is_empty() {
            bail!(
                "Azure AD tenant not configured. Set AZURE_TENANT_ID or [identity].tenant_id"
            );
        }
        if self.identity.client_credential().is_none() {
            bail!(
                "No client credential configured. \
                 Set AZURE_CLIENT_SECRET or AZURE_FEDERATED_TOKEN_FILE"
            );
        }
        if !self.identity.redirect_path.starts_with('/') {
            bail!(
                "redirect_path must start with '/', got '{}'",
                self.identity.redirect_path
            );
        }
        if !(1..=MAX_SESSION_DURATION_HOURS).contains(&self.session.session_duration_hours) {
            bail!(
                "session_duration_hours must be between 1 and {MAX_SESSION_DURATION_HOURS}, got {}",
                self.session.session_duration_hours
            );
        }
        Ok(())
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Absolute callback URL sent as `redirect_uri`
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}{}",
            self.application.redirect_base_url.trim_end_matches('/'),
            self.identity.redirect_path
        )
    }
}

impl IdentitySettings {
    /// Tenant-scoped authority URL without a trailing slash
    #[must_use]
    pub fn authority_url(&self) -> String {
        self.authority.as_ref().map_or_else(
            || {
                format!(
                    "{}/{}",
                    self.authority_host.trim_end_matches('/'),
                    self.tenant_id
                )
            },
            |authority| authority.trim_end_matches('/').to_string(),
        )
    }

    /// Client credential, preferring a secret over an assertion file
    #[must_use]
    pub fn client_credential(&self) -> Option<ClientCredential> {
        self.client_secret
            .clone()
            .filter(|s| !s.is_empty())
            .map(ClientCredential::Secret)
            .or_else(|| {
                self.client_assertion_file
                    .clone()
                    .filter(|p| !p.is_empty())
                    .map(|path| ClientCredential::AssertionFile(path.into()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clean_env_vars() {
        for var in [
            "SESSION_SECRET",
            "SESSION_DURATION_HOURS",
            "ENTRAGATE_SECRETS_DIR",
            "AZURE_CLIENT_ID",
            "AZURE_TENANT_ID",
            "AZURE_AUTHORITY",
            "AZURE_AUTHORITY_HOST",
            "AZURE_CLIENT_SECRET",
            "AZURE_FEDERATED_TOKEN_FILE",
            "REDIRECT_PATH",
            "SCOPES",
        ] {
            std::env::remove_var(var);
        }
    }

    fn configured_settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.identity.client_id = "client-123".to_string();
        settings.identity.tenant_id = "tenant-456".to_string();
        settings.identity.client_secret = Some("shh".to_string());
        settings
    }

    #[test]
    fn test_identity_defaults() {
        let identity = IdentitySettings::default();
        assert_eq!(identity.redirect_path, "/getAToken");
        assert_eq!(identity.scopes, vec!["User.Read".to_string()]);
        assert_eq!(identity.authority_host, DEFAULT_AUTHORITY_HOST);
    }

    #[test]
    fn test_authority_url_from_tenant() {
        let identity = IdentitySettings {
            tenant_id: "contoso".to_string(),
            authority_host: "https://login.microsoftonline.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            identity.authority_url(),
            "https://login.microsoftonline.com/contoso"
        );
    }

    #[test]
    fn test_explicit_authority_wins() {
        let identity = IdentitySettings {
            tenant_id: "ignored".to_string(),
            authority: Some("https://login.example.com/custom/".to_string()),
            ..Default::default()
        };
        assert_eq!(identity.authority_url(), "https://login.example.com/custom");
    }

    #[test]
    fn test_redirect_uri_joins_base_and_path() {
        let mut settings = configured_settings();
        settings.application.redirect_base_url = "https://app.example.com/".to_string();
        assert_eq!(settings.redirect_uri(), "https://app.example.com/getAToken");
    }

    #[test]
    fn test_client_credential_prefers_secret() {
        let identity = IdentitySettings {
            client_secret: Some("secret".to_string()),
            client_assertion_file: Some("/var/run/token".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            identity.client_credential(),
            Some(ClientCredential::Secret(ref s)) if s == "secret"
        ));
    }

    #[test]
    fn test_client_credential_falls_back_to_assertion_file() {
        let identity = IdentitySettings {
            client_secret: Some(String::new()),
            client_assertion_file: Some("/var/run/token".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            identity.client_credential(),
            Some(ClientCredential::AssertionFile(_))
        ));
    }

    #[test]
    fn test_validate_accepts_complete_settings() {
        assert!(configured_settings().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_pieces() {
        let mut settings = configured_settings();
        settings.identity.client_id.clear();
        assert!(settings.validate().unwrap_err().to_string().contains("client_id"));

        let mut settings = configured_settings();
        settings.identity.tenant_id.clear();
        assert!(settings.validate().unwrap_err().to_string().contains("tenant"));

        let mut settings = configured_settings();
        settings.identity.tenant_id.clear();
        settings.identity.authority = Some("https://login.example.com/t".to_string());
        assert!(settings.validate().is_ok());

        let mut settings = configured_settings();
        settings.identity.client_secret = None;
        assert!(settings
            .validate()
            .unwrap_err()
            .to_string()
            .contains("client credential"));

        let mut settings = configured_settings();
        settings.identity.redirect_path = "getAToken".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_session_duration() {
        let mut settings = configured_settings();
        settings.session.session_duration_hours = MAX_SESSION_DURATION_HOURS;
        assert!(settings.validate().is_ok());

        settings.session.session_duration_hours = 10_000_000_000_000_000;
        assert!(settings
            .validate()
            .unwrap_err()
            .to_string()
            .contains("session_duration_hours"));

        settings.session.session_duration_hours = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = AppSettings::from_toml(
            r#"
            [identity]
            client_id = "abc"
            tenant_id = "def"
            "#,
        )
        .unwrap();

        assert_eq!(settings.identity.client_id, "abc");
        assert_eq!(settings.identity.redirect_path, "/getAToken");
        assert_eq!(settings.application.port, 8080);
        assert!(settings.cookies.secure);
    }

    #[test]
    #[serial]
    fn test_identity_env_overrides() {
        clean_env_vars();
        std::env::set_var("AZURE_CLIENT_ID", "env-client");
        std::env::set_var("AZURE_TENANT_ID", "env-tenant");
        std::env::set_var("AZURE_CLIENT_SECRET", "env-secret");
        std::env::set_var("SCOPES", "User.Read, Mail.Read ,");

        let mut identity = IdentitySettings::default();
        AppSettings::apply_identity_env_overrides(&mut identity);

        assert_eq!(identity.client_id, "env-client");
        assert_eq!(identity.tenant_id, "env-tenant");
        assert_eq!(identity.client_secret.as_deref(), Some("env-secret"));
        assert_eq!(identity.scopes, vec!["User.Read", "Mail.Read"]);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_secret_env_override() {
        clean_env_vars();

        let mut session_settings = SessionSettings {
            session_secret: "default-secret".to_string(),
            session_duration_hours: 24,
        };
        std::env::set_var("SESSION_SECRET", "env-override-secret");

        AppSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.session_secret, "env-override-secret");
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_duration_env_override() {
        clean_env_vars();

        let mut session_settings = SessionSettings {
            session_secret: "test-secret".to_string(),
            session_duration_hours: 24,
        };
        std::env::set_var("SESSION_DURATION_HOURS", "48");

        AppSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.session_duration_hours, 48);
        assert_eq!(session_settings.session_secret, "test-secret");
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_secret_auto_generation() {
        clean_env_vars();

        let mut first = SessionSettings::default();
        let mut second = SessionSettings::default();
        AppSettings::apply_session_env_overrides(&mut first);
        AppSettings::apply_session_env_overrides(&mut second);

        // Base64url-encoded 32 bytes is 43 characters
        assert_eq!(first.session_secret.len(), 43);
        assert_ne!(first.session_secret, second.session_secret);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_secrets_dir_settings_file_is_parsed() {
        clean_env_vars();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Settings.toml"),
            "[identity]\nclient_id = \"from-secrets\"\ntenant_id = \"t\"\n",
        )
        .unwrap();
        std::env::set_var("ENTRAGATE_SECRETS_DIR", dir.path());

        let settings = AppSettings::load_base_settings().unwrap();
        assert_eq!(settings.identity.client_id, "from-secrets");

        clean_env_vars();
    }
}
