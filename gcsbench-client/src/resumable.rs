//! The resumable-upload protocol: session initiation, chunk uploads with
//! `Content-Range` bookkeeping, offset queries, and cancellation.

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::client::Client;
use crate::error::Error;
use crate::response::{ResumeState, parse_offset_response};

/// Chunk granularity of the upload service.
///
/// Every chunk except the final one must be a positive multiple of this size.
pub const MIN_CHUNK_SIZE: usize = 256 * 1024;

/// Opts out of the provider's proprietary "308 Resume Incomplete" status.
/// Continuation is then reported via the `X-HTTP-Status-Code-Override`
/// response header on a regular 200, which the offset-response parser
/// understands.
const NO_308_HEADER: &str = "X-GUploader-No-308";

#[derive(Debug, Serialize)]
struct SessionTarget<'a> {
    bucket: &'a str,
    name: &'a str,
}

impl Client {
    /// Starts a resumable upload session for `name` in `bucket`.
    ///
    /// The returned URL is the only handle to the session; pass it to
    /// [`upload_object_part`](Self::upload_object_part),
    /// [`resume_offset`](Self::resume_offset) and
    /// [`cancel_upload`](Self::cancel_upload). All session state lives on the
    /// server. A session that is neither finalized nor canceled stays live
    /// until the server expires it.
    pub async fn new_upload_session(&self, bucket: &str, name: &str) -> crate::Result<Url> {
        let url = self.inner.new_session_url(bucket)?;
        let response = self
            .inner
            .request(Method::POST, url)
            .await?
            .json(&SessionTarget { bucket, name })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Error::protocol(format!(
                "starting an upload failed with status {}",
                response.status()
            )));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .ok_or_else(|| Error::protocol("no Location header in the session response"))?;
        let location = location
            .to_str()
            .map_err(|_| Error::protocol("the Location header is not valid UTF-8"))?;
        let session = Url::parse(location).map_err(|err| {
            Error::protocol(format!("the Location header is not a URL: {err}"))
        })?;

        tracing::debug!(%session, "started resumable upload session");
        Ok(session)
    }

    /// Uploads one chunk of the object: `data` starting at `offset`.
    ///
    /// Chunks must be sent strictly in order; each one extends the prefix the
    /// service has already persisted. Every non-final chunk must be a
    /// positive multiple of [`MIN_CHUNK_SIZE`], which is checked before any
    /// network call. Only the final chunk may be empty, which finalizes the
    /// session at a total size of `offset`.
    ///
    /// The service reports its progress on every chunk, but this call
    /// deliberately does not return it; use
    /// [`resume_offset`](Self::resume_offset) to observe server-side
    /// progress.
    pub async fn upload_object_part(
        &self,
        session: &Url,
        offset: u64,
        data: Bytes,
        last: bool,
    ) -> crate::Result<()> {
        let content_range = content_range(offset, data.len(), last)?;
        tracing::debug!(%session, content_range, "uploading object part");

        let response = self
            .inner
            .request(Method::PUT, session.clone())
            .await?
            .header(reqwest::header::CONTENT_RANGE, content_range)
            .header(NO_308_HEADER, "yes")
            .body(data)
            .send()
            .await?;

        parse_offset_response(response).await?;
        Ok(())
    }

    /// Queries how far the session has progressed.
    ///
    /// This is the protocol's designated status request: a PUT with an empty
    /// body and `Content-Range: bytes */*`. It is the only way to learn the
    /// persisted offset without sending more data, and the offset it returns
    /// is exactly where the next chunk must resume.
    pub async fn resume_offset(&self, session: &Url) -> crate::Result<ResumeState> {
        let response = self
            .inner
            .request(Method::PUT, session.clone())
            .await?
            .header(reqwest::header::CONTENT_RANGE, "bytes */*")
            .header(NO_308_HEADER, "yes")
            .send()
            .await?;

        let state = parse_offset_response(response).await?;
        tracing::debug!(%session, ?state, "queried resume offset");
        Ok(state)
    }

    /// Cancels the session, discarding any bytes the service has persisted.
    pub async fn cancel_upload(&self, session: &Url) -> crate::Result<()> {
        let response = self
            .inner
            .request(Method::DELETE, session.clone())
            .await?
            .send()
            .await?;

        // The service is known to reply 499 to a correctly canceled session.
        let status = response.status();
        if status != StatusCode::OK && status.as_u16() != 499 {
            return Err(Error::protocol(format!(
                "canceling the upload failed with status {status}"
            )));
        }

        tracing::debug!(%session, "canceled resumable upload session");
        Ok(())
    }
}

/// Computes the `Content-Range` value for a chunk of `len` bytes at `offset`,
/// validating the chunk before any network traffic happens.
fn content_range(offset: u64, len: usize, last: bool) -> crate::Result<String> {
    if last {
        if len == 0 {
            // No more data; the total size is already known to be `offset`.
            return Ok(format!("bytes */{offset}"));
        }
        // The final chunk closes the range and declares the total size.
        let end = offset + len as u64;
        return Ok(format!("bytes {offset}-{}/{end}", end - 1));
    }

    if len == 0 {
        return Err(Error::invalid_chunk("only the final chunk may be empty"));
    }
    if len % MIN_CHUNK_SIZE != 0 {
        return Err(Error::invalid_chunk(format!(
            "chunk of {len} bytes is not a multiple of {MIN_CHUNK_SIZE}"
        )));
    }

    // Open-ended: the total size is not declared yet.
    let end = offset + len as u64;
    Ok(format!("bytes {offset}-{}/*", end - 1))
}
