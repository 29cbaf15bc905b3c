use std::fmt;
use std::sync::Arc;

/// The OAuth2 scope requested for uploads.
const SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// An opaque source of bearer tokens.
///
/// The client asks for a token before every outbound request and never
/// inspects it. Caching and refreshing tokens near expiry is the
/// implementation's concern.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + fmt::Debug {
    /// Returns a currently valid bearer token.
    async fn token(&self) -> crate::Result<String>;
}

/// A [`TokenSource`] backed by the ambient Google Cloud credentials.
///
/// Credentials are discovered once; the underlying provider caches tokens and
/// refreshes them transparently when they near expiry.
pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl fmt::Debug for GcpTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpTokenSource").finish_non_exhaustive()
    }
}

impl GcpTokenSource {
    /// Discovers credentials from the environment: service account files,
    /// application default credentials, or the metadata server.
    pub async fn discover() -> crate::Result<Self> {
        let provider = gcp_auth::provider().await?;
        Ok(Self { provider })
    }
}

#[async_trait::async_trait]
impl TokenSource for GcpTokenSource {
    async fn token(&self) -> crate::Result<String> {
        let token = self.provider.token(&[SCOPE]).await?;
        Ok(token.as_str().to_owned())
    }
}
