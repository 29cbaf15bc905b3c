//! Random payload generation for upload bodies.

use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Produces `len` bytes of random data.
///
/// Random payloads defeat any transparent compression or deduplication
/// between here and the storage backend, which would otherwise skew the
/// measured throughput.
pub fn random(len: usize) -> Bytes {
    let mut buf = vec![0u8; len];
    let mut rng = SmallRng::from_os_rng();
    rng.fill_bytes(&mut buf);
    Bytes::from(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_the_requested_length() {
        assert_eq!(random(0).len(), 0);
        assert_eq!(random(4096).len(), 4096);
    }

    #[test]
    fn produces_different_payloads() {
        assert_ne!(random(1024), random(1024));
    }
}
