//! Measures upload throughput to Google Cloud Storage.
//!
//! Two scenarios are supported: single-request PUT uploads (`obj`) and
//! resumable uploads split into two chunks with interleaved offset queries
//! (`mobj`). Each scenario runs a configurable number of repetitions against
//! a destination bucket and reports the mean and spread of the achieved
//! throughput.
//!
//! Uploads run strictly sequentially and there are no retries: a single
//! failed repetition aborts the whole run, so every reported sample reflects
//! an unperturbed protocol exchange.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;
use bytesize::ByteSize;
use gcsbench_client::{Client, GcpTokenSource};

use crate::bench::{MultipartScenario, SimpleScenario, run_benchmark};

mod bench;
mod payload;
mod report;

/// Upload throughput benchmarks for Google Cloud Storage.
#[derive(Debug, FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Obj(ObjCommand),
    Mobj(MobjCommand),
    Version(VersionCommand),
}

/// benchmark single-request object uploads
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "obj")]
struct ObjCommand {
    /// destination bucket
    #[argh(option, short = 'b')]
    bucket: String,

    /// object name to upload under
    #[argh(option, short = 'n', default = "String::from(\"x\")")]
    name: String,

    /// payload size, as a human-readable byte size
    #[argh(option, short = 's', default = "bytesize::ByteSize::kib(4)")]
    size: ByteSize,

    /// number of repetitions
    #[argh(option, short = 'r', default = "5")]
    repeat: u32,
}

/// benchmark resumable uploads, two chunks per object
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "mobj")]
struct MobjCommand {
    /// destination bucket
    #[argh(option, short = 'b')]
    bucket: String,

    /// object name to upload under
    #[argh(option, short = 'n', default = "String::from(\"x\")")]
    name: String,

    /// chunk size, as a human-readable byte size; must be a multiple of
    /// 256 KiB
    #[argh(option, short = 'c', default = "bytesize::ByteSize::kib(256)")]
    chunk: ByteSize,

    /// number of repetitions
    #[argh(option, short = 'r', default = "5")]
    repeat: u32,
}

/// print the gcsbench version
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCommand {}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if let Command::Version(_) = args.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing();
    tracing::debug!(?args);

    let tokens = Arc::new(GcpTokenSource::discover().await?);
    let client = Client::builder(tokens).build()?;

    match args.command {
        Command::Obj(cmd) => {
            let scenario = SimpleScenario {
                bucket: cmd.bucket,
                name: cmd.name,
                size: cmd.size.as_u64(),
            };
            run_benchmark(&client, &scenario, cmd.repeat).await
        }
        Command::Mobj(cmd) => {
            let scenario = MultipartScenario {
                bucket: cmd.bucket,
                name: cmd.name,
                chunk_size: cmd.chunk.as_u64(),
            };
            run_benchmark(&client, &scenario, cmd.repeat).await
        }
        Command::Version(_) => unreachable!(),
    }
}

/// Logs go to stderr so they do not interleave with the measurements on
/// stdout.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}
