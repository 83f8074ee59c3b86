use crate::{Context, Meta};
use models::Tag;
use serde::Deserialize;
use std::sync::Arc;

/// Configuration of the provider, from command-line flags, the
/// environment, or a provider block handed over by the orchestrator.
#[derive(clap::Args, Deserialize, Clone)]
pub struct ProviderConfig {
    /// URL of the Circonus API.
    #[clap(long, env = "CIRCONUS_API_URL", default_value = DEFAULT_API_URL)]
    #[serde(default = "default_api_url")]
    pub api_url: url::Url,
    /// API token used to authenticate.
    #[clap(long, env = "CIRCONUS_API_TOKEN", hide_env_values = true)]
    pub api_token: String,
    #[clap(flatten)]
    #[serde(flatten)]
    pub tagging: TagConfig,
}

/// Automatic tagging of created entities.
#[derive(clap::Args, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagConfig {
    /// Add the default tag to every entity which carries tags.
    #[clap(long, env = "CIRCONUS_AUTO_TAG")]
    #[serde(default)]
    pub auto_tag: bool,
    /// Tag added when auto-tagging.
    #[clap(long, default_value = crate::context::DEFAULT_TAG)]
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

pub const DEFAULT_API_URL: &str = "https://api.circonus.com/v2";

fn default_api_url() -> url::Url {
    url::Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

fn default_tag() -> String {
    crate::context::DEFAULT_TAG.to_string()
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            auto_tag: false,
            default_tag: default_tag(),
        }
    }
}

impl TagConfig {
    pub fn meta(&self) -> Meta {
        Meta {
            auto_tag: self.auto_tag,
            default_tag: Tag::new(&self.default_tag),
        }
    }
}

impl ProviderConfig {
    /// Build the context shared by every operation of this provider.
    pub fn configure(&self) -> Context {
        tracing::debug!(api_url = %self.api_url, auto_tag = self.tagging.auto_tag, "configuring provider");

        let transport =
            api::HttpTransport::new(self.api_url.clone(), self.api_token.clone(), api::APP_NAME);
        Context::new(api::Client::new(Arc::new(transport)), self.tagging.meta())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"<redacted>")
            .field("tagging", &self.tagging)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_block() {
        let config: ProviderConfig = serde_json::from_value(json!({
            "api_token": "secret",
            "auto_tag": true,
        }))
        .unwrap();

        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(
            config.tagging.meta(),
            Meta {
                auto_tag: true,
                default_tag: Tag::new("author:terraform"),
            }
        );
        assert!(!format!("{config:?}").contains("secret"));

        serde_json::from_value::<ProviderConfig>(json!({"api_url": "https://example.com"}))
            .unwrap_err();
    }
}
