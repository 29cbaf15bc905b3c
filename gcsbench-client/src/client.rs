use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::TokenSource;
use crate::error::Error;

const USER_AGENT: &str = concat!("gcsbench-client/", env!("CARGO_PKG_VERSION"));

/// The production upload endpoint.
const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

#[derive(Debug)]
struct ClientBuilderInner {
    endpoint: Url,
    path_style: bool,
    token_source: Arc<dyn TokenSource>,
    reqwest_builder: reqwest::ClientBuilder,
}

/// Builder to create a [`Client`].
#[must_use]
#[derive(Debug)]
pub struct ClientBuilder(crate::Result<ClientBuilderInner>);

impl ClientBuilder {
    /// Creates a new [`ClientBuilder`] that authenticates every request with
    /// the given `token_source`.
    pub fn new(token_source: Arc<dyn TokenSource>) -> Self {
        let endpoint = match Url::parse(DEFAULT_ENDPOINT) {
            Ok(url) => url,
            Err(err) => {
                return Self(Err(Error::InvalidUrl {
                    message: err.to_string(),
                }));
            }
        };

        let reqwest_builder = reqwest::Client::builder().user_agent(USER_AGENT);

        Self(Ok(ClientBuilderInner {
            endpoint,
            path_style: false,
            token_source,
            reqwest_builder,
        }))
    }

    /// Points the client at a different service endpoint.
    ///
    /// The production endpoint addresses buckets as subdomains; a custom
    /// endpoint usually wants [`path_style`](Self::path_style) addressing as
    /// well.
    pub fn endpoint(self, endpoint: impl reqwest::IntoUrl) -> Self {
        let Ok(inner) = self.0 else { return self };
        match endpoint.into_url() {
            Ok(endpoint) => Self(Ok(ClientBuilderInner { endpoint, ..inner })),
            Err(err) => Self(Err(err.into())),
        }
    }

    /// Addresses objects as `<endpoint>/<bucket>/<object>` instead of
    /// `https://<bucket>.<endpoint host>/<object>`.
    pub fn path_style(self, path_style: bool) -> Self {
        let Ok(inner) = self.0 else { return self };
        Self(Ok(ClientBuilderInner { path_style, ..inner }))
    }

    /// Sets both the connect and the read timeout for the [`reqwest::Client`].
    /// For more fine-grained configuration, use [`Self::configure_reqwest`].
    pub fn timeout(self, timeout: Duration) -> Self {
        let Ok(inner) = self.0 else { return self };
        Self(Ok(ClientBuilderInner {
            endpoint: inner.endpoint,
            path_style: inner.path_style,
            token_source: inner.token_source,
            reqwest_builder: inner
                .reqwest_builder
                .connect_timeout(timeout)
                .read_timeout(timeout),
        }))
    }

    /// Calls the closure with the underlying [`reqwest::ClientBuilder`].
    pub fn configure_reqwest<F>(self, closure: F) -> Self
    where
        F: FnOnce(reqwest::ClientBuilder) -> reqwest::ClientBuilder,
    {
        let Ok(inner) = self.0 else { return self };
        Self(Ok(ClientBuilderInner {
            endpoint: inner.endpoint,
            path_style: inner.path_style,
            token_source: inner.token_source,
            reqwest_builder: closure(inner.reqwest_builder),
        }))
    }

    /// Returns a [`Client`] that uses this [`ClientBuilder`] configuration.
    ///
    /// # Errors
    ///
    /// This method fails if:
    /// - a given `endpoint` is not a valid URL
    /// - the [`reqwest::Client`] fails to build. Refer to
    ///   [`reqwest::ClientBuilder::build`] for more information on when this
    ///   can happen.
    pub fn build(self) -> crate::Result<Client> {
        self.0.and_then(|inner| {
            Ok(Client {
                inner: Arc::new(ClientInner {
                    reqwest: inner.reqwest_builder.build()?,
                    endpoint: inner.endpoint,
                    path_style: inner.path_style,
                    token_source: inner.token_source,
                }),
            })
        })
    }
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    reqwest: reqwest::Client,
    endpoint: Url,
    path_style: bool,
    token_source: Arc<dyn TokenSource>,
}

impl ClientInner {
    /// Builds a request with the bearer token attached.
    pub(crate) async fn request(
        &self,
        method: reqwest::Method,
        url: Url,
    ) -> crate::Result<reqwest::RequestBuilder> {
        let token = self.token_source.token().await?;
        Ok(self.reqwest.request(method, url).bearer_auth(token))
    }

    /// The direct URL of an object, used by the single-request upload path.
    pub(crate) fn object_url(&self, bucket: &str, name: &str) -> crate::Result<Url> {
        if self.path_style {
            return join(&self.endpoint, &format!("{bucket}/{name}"));
        }

        let mut url = self.endpoint.clone();
        let host = match url.host_str() {
            Some(host) => format!("{bucket}.{host}"),
            None => {
                return Err(Error::InvalidUrl {
                    message: format!("endpoint {} has no host", self.endpoint),
                });
            }
        };
        url.set_host(Some(&host)).map_err(|err| Error::InvalidUrl {
            message: format!("cannot address bucket {bucket:?} as a subdomain: {err}"),
        })?;
        url.set_path(name);
        Ok(url)
    }

    /// The bucket endpoint that initiates resumable upload sessions.
    pub(crate) fn new_session_url(&self, bucket: &str) -> crate::Result<Url> {
        let mut url = join(&self.endpoint, &format!("upload/storage/v1/b/{bucket}/o"))?;
        url.query_pairs_mut().append_pair("uploadType", "resumable");
        Ok(url)
    }
}

fn join(base: &Url, path: &str) -> crate::Result<Url> {
    base.join(path).map_err(|err| Error::InvalidUrl {
        message: format!("cannot join {path:?} onto {base}: {err}"),
    })
}

/// A client for the storage upload API. Use [`Client::builder`] to configure
/// and construct this.
///
/// The client holds the HTTP connection pool and the token source; it is
/// cheap to clone and carries no upload state. Resumable sessions are
/// identified purely by the URL returned from
/// [`new_upload_session`](Client::new_upload_session), which the caller
/// passes to every subsequent call.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl Client {
    /// Convenience function to create a [`ClientBuilder`].
    pub fn builder(token_source: Arc<dyn TokenSource>) -> ClientBuilder {
        ClientBuilder::new(token_source)
    }
}
