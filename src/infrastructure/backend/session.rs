use crate::application::ports::session::SessionProvider;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Session holder fed by the auth layer. Tokens are swapped in place on refresh.
#[derive(Default)]
pub struct StaticTokenSession {
    inner: RwLock<Option<SessionTokens>>,
}

#[derive(Debug, Clone)]
struct SessionTokens {
    access_token: String,
    user_id: String,
}

impl StaticTokenSession {
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(SessionTokens {
                access_token: access_token.into(),
                user_id: user_id.into(),
            })),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub async fn set(&self, access_token: impl Into<String>, user_id: impl Into<String>) {
        *self.inner.write().await = Some(SessionTokens {
            access_token: access_token.into(),
            user_id: user_id.into(),
        });
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for StaticTokenSession {
    async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    async fn user_id(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_clear_replace_tokens() {
        let session = StaticTokenSession::anonymous();
        assert_eq!(session.access_token().await, None);

        session.set("t1", "u1").await;
        assert_eq!(session.access_token().await.as_deref(), Some("t1"));
        assert_eq!(session.user_id().await.as_deref(), Some("u1"));

        session.clear().await;
        assert_eq!(session.user_id().await, None);
    }
}
