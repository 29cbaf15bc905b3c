//! The single-request upload path.

use bytes::Bytes;
use reqwest::{Method, StatusCode};

use crate::client::Client;
use crate::error::Error;

impl Client {
    /// Stores `data` as `name` in `bucket` with a single PUT request.
    pub async fn upload_object(&self, bucket: &str, name: &str, data: Bytes) -> crate::Result<()> {
        let url = self.inner.object_url(bucket, name)?;
        tracing::debug!(%url, bytes = data.len(), "uploading object");

        let response = self
            .inner
            .request(Method::PUT, url)
            .await?
            .body(data)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Error::protocol(format!(
                "upload failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
