use async_trait::async_trait;

/// Supplies the bearer token of the signed-in user. Session refresh happens
/// elsewhere.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
    async fn user_id(&self) -> Option<String>;
}
