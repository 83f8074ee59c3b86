use crate::Error;
use models::Tag;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Meta is provider configuration which translators consult.
/// It's fixed when the provider is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    /// Add `default_tag` to every taggable entity.
    pub auto_tag: bool,
    pub default_tag: Tag,
}

pub const DEFAULT_TAG: &str = "author:terraform";

impl Default for Meta {
    fn default() -> Self {
        Self {
            auto_tag: false,
            default_tag: Tag::new(DEFAULT_TAG),
        }
    }
}

/// Context of a single resource operation: the shared platform client,
/// provider metadata, and the operation's cancellation token.
#[derive(Clone)]
pub struct Context {
    pub client: api::Client,
    pub meta: Meta,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(client: api::Client, meta: Meta) -> Self {
        Self {
            client,
            meta,
            cancel: CancellationToken::new(),
        }
    }

    /// Derive a context for one operation, cancelled with `token`.
    pub fn with_cancel(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    /// Await a platform call of `entity` identified by `id`, unless the
    /// operation is cancelled first.
    pub async fn call<T, F>(&self, entity: &'static str, id: &str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, api::Error>>,
    {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                tracing::debug!(%entity, %id, "platform call cancelled");
                Err(Error::Cancelled)
            }
            result = fut => result.map_err(|source| Error::Platform {
                entity,
                id: id.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    fn context() -> Context {
        let transport = Arc::new(api::MemoryTransport::new());
        Context::new(api::Client::new(transport), Meta::default())
    }

    #[tokio::test]
    async fn test_call_wraps_platform_errors() {
        let ctx = context();
        let err = ctx
            .call(
                "rule_set",
                "/rule_set/1_foo",
                ctx.client.fetch::<api::RuleSet>("/rule_set/1_foo"),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("rule_set \"/rule_set/1_foo\": API response code 404"));
    }

    #[tokio::test]
    async fn test_call_is_cancelled() {
        let token = CancellationToken::new();
        let ctx = context().with_cancel(token.clone());
        token.cancel();

        let err = ctx
            .call("graph", "/graph/1", std::future::pending::<Result<(), api::Error>>())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
