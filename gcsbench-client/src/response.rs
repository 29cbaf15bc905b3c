//! Interprets chunk-upload and status-query responses.
//!
//! With the no-308 convention requested, the service reports an in-progress
//! session as a 200 carrying an `X-HTTP-Status-Code-Override: 308` header and
//! (once bytes are persisted) a `Range` header, while a finished upload
//! replies with the stored object's JSON resource. This quirk is specific to
//! one provider's resumable-upload implementation; alternate providers or
//! protocol versions can be supported by swapping this parser.

use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::Error;

/// Header carrying the real ("overridden") status code of the reply.
const STATUS_OVERRIDE_HEADER: &str = "X-HTTP-Status-Code-Override";

/// Progress of a resumable upload session, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeState {
    /// While `complete` is `false`: the number of bytes the service has
    /// durably received, which is the offset the next chunk must start at.
    /// Once `complete` is `true`: the total size of the stored object.
    pub offset: u64,
    /// Whether the object is fully stored.
    pub complete: bool,
}

/// The stored object's JSON resource. Only the size matters here.
#[derive(Debug, Deserialize)]
struct ObjectResource {
    /// The JSON API encodes this uint64 as a decimal string.
    #[serde(deserialize_with = "u64_from_string")]
    size: u64,
}

fn u64_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
}

/// Determines how far a resumable upload has progressed from the response to
/// a chunk upload or a status query.
pub(crate) async fn parse_offset_response(response: Response) -> crate::Result<ResumeState> {
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(Error::protocol(format!(
            "chunk upload failed with status {status}"
        )));
    }

    let is_continuation = response
        .headers()
        .get(STATUS_OVERRIDE_HEADER)
        .is_some_and(|value| value.as_bytes() == b"308");

    if !is_continuation {
        // The upload was successfully completed. This response has no Range
        // header, but the body is a JSON resource describing the stored
        // object.
        let object: ObjectResource = response
            .json()
            .await
            .map_err(|_| Error::protocol("the response body is not a valid object resource"))?;
        return Ok(ResumeState {
            offset: object.size,
            complete: true,
        });
    }

    let offset = match response.headers().get(reqwest::header::RANGE) {
        // No Range header is sent before any bytes have been persisted.
        None => 0,
        // The header specifies the persisted range as [0, n] instead of
        // [0, n), so the next offset is n + 1.
        Some(range) => {
            parse_range_end(range.as_bytes()).ok_or_else(|| {
                Error::protocol(format!("malformed Range header in the reply: {range:?}"))
            })? + 1
        }
    };

    Ok(ResumeState {
        offset,
        complete: false,
    })
}

/// Parses the inclusive end `n` out of a `bytes=0-<n>` header value.
///
/// Persisted ranges always start at zero: a chunk extends the previously
/// persisted prefix, sessions never have gaps.
fn parse_range_end(value: &[u8]) -> Option<u64> {
    let end = value.strip_prefix(b"bytes=0-")?;
    std::str::from_utf8(end).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(builder: http::response::Builder, body: &'static str) -> Response {
        Response::from(builder.body(body).unwrap())
    }

    #[tokio::test]
    async fn completed_upload_reports_object_size() {
        let response = make_response(
            http::Response::builder().status(200),
            r#"{"bucket": "test", "name": "x", "size": "524288"}"#,
        );

        let state = parse_offset_response(response).await.unwrap();
        assert_eq!(
            state,
            ResumeState {
                offset: 524288,
                complete: true
            }
        );
    }

    #[tokio::test]
    async fn completed_upload_ignores_range_header() {
        // Without the override header the body decides, even if a Range
        // header is present.
        let response = make_response(
            http::Response::builder()
                .status(200)
                .header("Range", "bytes=0-99"),
            r#"{"size": "4096"}"#,
        );

        let state = parse_offset_response(response).await.unwrap();
        assert_eq!(
            state,
            ResumeState {
                offset: 4096,
                complete: true
            }
        );
    }

    #[tokio::test]
    async fn continuation_converts_inclusive_range() {
        let response = make_response(
            http::Response::builder()
                .status(200)
                .header(STATUS_OVERRIDE_HEADER, "308")
                .header("Range", "bytes=0-1048575"),
            "",
        );

        let state = parse_offset_response(response).await.unwrap();
        assert_eq!(
            state,
            ResumeState {
                offset: 1048576,
                complete: false
            }
        );
    }

    #[tokio::test]
    async fn continuation_without_range_means_nothing_persisted() {
        let response = make_response(
            http::Response::builder()
                .status(200)
                .header(STATUS_OVERRIDE_HEADER, "308"),
            "",
        );

        let state = parse_offset_response(response).await.unwrap();
        assert_eq!(
            state,
            ResumeState {
                offset: 0,
                complete: false
            }
        );
    }

    #[tokio::test]
    async fn malformed_range_is_a_protocol_error() {
        for value in ["bytes 0-100", "bytes=1-100", "bytes=0-abc", "garbage"] {
            let response = make_response(
                http::Response::builder()
                    .status(200)
                    .header(STATUS_OVERRIDE_HEADER, "308")
                    .header("Range", value),
                "",
            );

            let err = parse_offset_response(response).await.unwrap_err();
            assert!(matches!(err, Error::Protocol { .. }), "{value}: {err:?}");
        }
    }

    #[tokio::test]
    async fn unexpected_status_is_a_protocol_error() {
        let response = make_response(http::Response::builder().status(503), "unavailable");

        let err = parse_offset_response(response).await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn created_status_is_accepted() {
        let response = make_response(http::Response::builder().status(201), r#"{"size": "1"}"#);

        let state = parse_offset_response(response).await.unwrap();
        assert!(state.complete);
        assert_eq!(state.offset, 1);
    }

    #[tokio::test]
    async fn invalid_body_is_a_protocol_error() {
        let response = make_response(http::Response::builder().status(200), "not json");

        let err = parse_offset_response(response).await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }), "{err:?}");
    }
}
