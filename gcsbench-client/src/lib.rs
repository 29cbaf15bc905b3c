//! # gcsbench-client
//!
//! An upload client for Google Cloud Storage, built for benchmarking. It
//! drives both the single-request PUT path and the resumable-upload protocol:
//! session initiation, chunked uploads with `Content-Range` bookkeeping,
//! offset queries, and cancellation.
//!
//! There are no retries and no hidden state. Every network failure is
//! terminal for the current operation and surfaces to the caller unchanged,
//! so that measured timings reflect exactly one protocol exchange. A caller
//! targeting production use should layer a retry policy on top rather than
//! expect one here.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gcsbench_client::{Client, GcpTokenSource, MIN_CHUNK_SIZE};
//!
//! # #[tokio::main]
//! # async fn main() -> gcsbench_client::Result<()> {
//! let tokens = Arc::new(GcpTokenSource::discover().await?);
//! let client = Client::builder(tokens).build()?;
//!
//! let session = client.new_upload_session("my-bucket", "my-object").await?;
//!
//! let chunk = bytes::Bytes::from(vec![0u8; MIN_CHUNK_SIZE]);
//! client.upload_object_part(&session, 0, chunk.clone(), false).await?;
//! let state = client.resume_offset(&session).await?;
//! assert_eq!(state.offset, MIN_CHUNK_SIZE as u64);
//!
//! client.upload_object_part(&session, state.offset, chunk, true).await?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod auth;
mod client;
mod error;
mod response;
mod resumable;
mod upload;

pub use auth::*;
pub use client::*;
pub use error::*;
pub use response::ResumeState;
pub use resumable::MIN_CHUNK_SIZE;
