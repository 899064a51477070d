//! # Klaxon Configuration System
//!
//! Hierarchical configuration for the alert pipeline. Nothing that
//! identifies an account, a phone number or a public host is compiled in;
//! those values arrive from files or the environment.
//!
//! ## Features
//! - **Unified Configuration**: Single source of truth across all crates
//! - **Validation**: Runtime validation of every field before anything is sent
//! - **Environment Awareness**: `KLAXON_ENV` selects per-environment overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod alert;
mod dispatch;
mod error;
mod provider;
mod recipients;
mod telemetry;
mod validation;

pub use alert::LocationConfig;
pub use alert::VoiceConfig;
pub use dispatch::DispatchConfig;
pub use error::ConfigError;
pub use provider::ProviderConfig;
pub use recipients::RecipientsConfig;
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/klaxon.yaml";
const ENV_PREFIX: &str = "KLAXON_";

/// Top‑level configuration container for all Klaxon components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct KlaxonConfig {
    /// Location file parameters.
    #[validate(nested)]
    #[serde(default)]
    pub location: LocationConfig,

    /// Voice-response document and its public URL.
    #[validate(nested)]
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Provider credentials and endpoint.
    #[validate(nested)]
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Sender and recipients.
    #[validate(nested)]
    #[serde(default)]
    pub recipients: RecipientsConfig,

    /// Retry policy for outbound requests.
    #[validate(nested)]
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging configuration.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl KlaxonConfig {
    /// Load and fully validate configuration.
    ///
    /// Hierarchy when `path` is `None`:
    /// 1. Default Values
    /// 2. `config/klaxon.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - Environment‑specific overrides.
    /// 4. `KLAXON_*` environment variables.
    ///
    /// With an explicit `path`, that file replaces steps 2 and 3 and must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::extract(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for offline use (rendering, previews).
    ///
    /// Only the location and voice sections are validated, so provider
    /// credentials and phone numbers may be absent.
    pub fn load_for_render(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::extract(path)?;
        config.validate_for_render()?;
        Ok(config)
    }

    /// Validate only the sections needed to build alert content.
    pub fn validate_for_render(&self) -> Result<(), ConfigError> {
        self.location.validate()?;
        self.voice.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }

    /// Copy safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            provider: self.provider.redacted(),
            ..self.clone()
        }
    }

    fn extract(path: Option<&Path>) -> Result<Self, ConfigError> {
        let figment = match path {
            Some(path) => Self::explicit(path)?,
            None => Self::layered(),
        };

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    fn explicit(path: &Path) -> Result<Figment, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }
        Ok(Figment::from(Serialized::defaults(KlaxonConfig::default())).merge(Yaml::file(path)))
    }

    fn layered() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(KlaxonConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("KLAXON_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const FULL: &str = r#"
location:
  path: /var/lib/gps/log.txt
voice:
  document_path: /srv/www/twilio.xml
  callback_url: http://alerts.example.org/twilio.xml
provider:
  account_sid: AC0123456789abcdef0123456789abcdef
  auth_token: from-file
recipients:
  from: "+12673146105"
  sms_to: "+19253099700"
  call_to: "+16692379199"
"#;

    #[test]
    fn default_config_is_incomplete() {
        let config = KlaxonConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_file_and_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/klaxon.yaml", FULL)?;
            jail.set_env("KLAXON_PROVIDER__AUTH_TOKEN", "from-env");
            jail.set_env("KLAXON_DISPATCH__MAX_ATTEMPTS", "3");

            let config = KlaxonConfig::load(None).expect("config should load");
            assert_eq!(config.provider.auth_token, "from-env");
            assert_eq!(config.dispatch.max_attempts, 3);
            assert_eq!(config.voice.voice, "alice");
            assert_eq!(config.recipients.sms_to, "+19253099700");
            assert_eq!(config.location.path, PathBuf::from("/var/lib/gps/log.txt"));
            Ok(())
        });
    }

    #[test]
    fn environment_file_overrides_base() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/klaxon.yaml", FULL)?;
            jail.create_file("config/staging.yaml", "voice:\n  voice: man\n")?;
            jail.set_env("KLAXON_ENV", "staging");

            let config = KlaxonConfig::load(None).expect("config should load");
            assert_eq!(config.voice.voice, "man");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = KlaxonConfig::load(Some(Path::new("/nonexistent/klaxon.yaml")))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn missing_credentials_are_reported_per_field() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "render.yaml",
                "voice:\n  callback_url: http://alerts.example.org/twilio.xml\n",
            )?;
            let err = KlaxonConfig::load(Some(Path::new("render.yaml")))
                .expect_err("credentials are required");
            let message = err.to_string();
            assert!(message.contains("provider.account_sid"), "{}", message);
            assert!(message.contains("recipients.sms_to"), "{}", message);
            Ok(())
        });
    }

    #[test]
    fn render_mode_skips_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "render.yaml",
                "voice:\n  callback_url: http://alerts.example.org/twilio.xml\n",
            )?;
            let config = KlaxonConfig::load_for_render(Some(Path::new("render.yaml")))
                .expect("render config should load");
            assert!(config.provider.account_sid.is_empty());
            Ok(())
        });
    }

    #[test]
    fn redacted_config_hides_token() {
        let mut config = KlaxonConfig::default();
        config.provider.auth_token = "s3cr3t".into();
        assert_ne!(config.redacted().provider.auth_token, "s3cr3t");
    }
}
