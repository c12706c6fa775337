/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Claim/commit transport publication interface.
//!
//! Outbound replay traffic goes through [`Publication`]: the engine claims a
//! region of the requested length, fills it, and commits. A claim can fail
//! transiently under back-pressure; the engine retries with backoff up to a
//! configured attempt limit. The in-memory implementation backs tests.

/// Transient claim failure; the transport had no capacity for the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackPressure;

/// Claim-based send interface.
///
/// A successful claim must be followed by exactly one `commit` or `abort`
/// before the next claim.
pub trait Publication {
    /// Reserves a writable region of exactly `length` bytes.
    ///
    /// # Errors
    /// [`BackPressure`] when the transport cannot accept the region now.
    fn try_claim(&mut self, length: usize) -> Result<&mut [u8], BackPressure>;

    /// Publishes the most recently claimed region.
    fn commit(&mut self);

    /// Discards the most recently claimed region.
    fn abort(&mut self);
}

/// In-memory publication capturing committed messages.
///
/// Supports injecting a number of leading claim failures to exercise the
/// engine's bounded-retry path.
#[derive(Debug, Default)]
pub struct MemoryPublication {
    pending: Option<Vec<u8>>,
    committed: Vec<Vec<u8>>,
    remaining_failures: usize,
}

impl MemoryPublication {
    /// Creates a publication that accepts every claim.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` claims fail with back-pressure.
    pub fn fail_next_claims(&mut self, count: usize) {
        self.remaining_failures = count;
    }

    /// Returns the committed messages in publication order.
    #[must_use]
    pub fn committed(&self) -> &[Vec<u8>] {
        &self.committed
    }
}

impl Publication for MemoryPublication {
    fn try_claim(&mut self, length: usize) -> Result<&mut [u8], BackPressure> {
        if self.remaining_failures > 0 {
            self.remaining_failures -= 1;
            return Err(BackPressure);
        }
        Ok(self.pending.insert(vec![0u8; length]).as_mut_slice())
    }

    fn commit(&mut self) {
        if let Some(region) = self.pending.take() {
            self.committed.push(region);
        }
    }

    fn abort(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_commit() {
        let mut publication = MemoryPublication::new();

        let region = publication.try_claim(5).unwrap();
        region.copy_from_slice(b"hello");
        publication.commit();

        assert_eq!(publication.committed(), &[b"hello".to_vec()]);
    }

    #[test]
    fn test_abort_discards_claim() {
        let mut publication = MemoryPublication::new();

        let region = publication.try_claim(3).unwrap();
        region.copy_from_slice(b"abc");
        publication.abort();

        assert!(publication.committed().is_empty());
    }

    #[test]
    fn test_injected_back_pressure() {
        let mut publication = MemoryPublication::new();
        publication.fail_next_claims(2);

        assert_eq!(publication.try_claim(1), Err(BackPressure));
        assert_eq!(publication.try_claim(1), Err(BackPressure));
        assert!(publication.try_claim(1).is_ok());
    }
}
