//! Timed upload scenarios and the repetition driver.

use std::time::{Duration, Instant};

use anyhow::Result;
use bytesize::ByteSize;
use gcsbench_client::Client;
use yansi::Paint;

use crate::payload;
use crate::report;

/// One upload scenario that can be repeated and timed.
#[async_trait::async_trait]
pub trait Scenario: Sync {
    /// The number of payload bytes one iteration uploads.
    fn bytes(&self) -> u64;

    /// Runs a single iteration, returning the elapsed wall-clock time.
    async fn run_once(&self, client: &Client) -> Result<Duration>;
}

/// Repeats the scenario, printing one line per repetition and a throughput
/// summary at the end.
///
/// Repetitions run strictly sequentially, one request at a time. The first
/// failure aborts the run; no partial aggregates are reported.
pub async fn run_benchmark(client: &Client, scenario: &dyn Scenario, repeat: u32) -> Result<()> {
    let bytes = scenario.bytes();
    let mut samples = Vec::with_capacity(repeat as usize);

    for repetition in 1..=repeat {
        let elapsed = scenario.run_once(client).await?;

        let throughput = bytes as f64 / elapsed.as_secs_f64();
        samples.push(throughput);

        println!(
            "repetition {repetition}\ttime {elapsed:.2?}\tspeed {}/s",
            ByteSize::b(throughput as u64).bold(),
        );
    }

    report::print_summary(&samples);
    Ok(())
}

/// A single-request upload of `size` random bytes.
#[derive(Debug)]
pub struct SimpleScenario {
    /// Destination bucket.
    pub bucket: String,
    /// Object name to upload under.
    pub name: String,
    /// Payload size in bytes.
    pub size: u64,
}

#[async_trait::async_trait]
impl Scenario for SimpleScenario {
    fn bytes(&self) -> u64 {
        self.size
    }

    async fn run_once(&self, client: &Client) -> Result<Duration> {
        // Generated outside the timed region: this measures the upload, not
        // the RNG.
        let data = payload::random(self.size as usize);

        let start = Instant::now();
        client.upload_object(&self.bucket, &self.name, data).await?;
        Ok(start.elapsed())
    }
}

/// A resumable upload of two `chunk_size`d chunks, querying the persisted
/// offset after each chunk for diagnostic visibility.
#[derive(Debug)]
pub struct MultipartScenario {
    /// Destination bucket.
    pub bucket: String,
    /// Object name to upload under.
    pub name: String,
    /// Size of each of the two chunks, in bytes.
    pub chunk_size: u64,
}

#[async_trait::async_trait]
impl Scenario for MultipartScenario {
    fn bytes(&self) -> u64 {
        2 * self.chunk_size
    }

    async fn run_once(&self, client: &Client) -> Result<Duration> {
        let chunk_size = self.chunk_size as usize;
        let data = payload::random(2 * chunk_size);

        let start = Instant::now();
        let session = client.new_upload_session(&self.bucket, &self.name).await?;

        client
            .upload_object_part(&session, 0, data.slice(..chunk_size), false)
            .await?;
        let state = client.resume_offset(&session).await?;
        println!("resume offset {}, complete {}", state.offset, state.complete);

        client
            .upload_object_part(&session, chunk_size as u64, data.slice(chunk_size..), true)
            .await?;
        let state = client.resume_offset(&session).await?;
        println!("resume offset {}, complete {}", state.offset, state.complete);

        Ok(start.elapsed())
    }
}
