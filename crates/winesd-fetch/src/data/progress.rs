use crate::data::options::FetchPhase;

/// Snapshot handed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current phase of the transfer.
    pub phase: FetchPhase,

    /// Bytes written to the sink so far.
    pub bytes_downloaded: u64,

    /// Expected total. For verified downloads this is the catalog size; for
    /// plain fetches it is the Content-Length header, when present.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Percentage of completion, clamped to 100 for display.
    ///
    /// Returns `None` if `total_bytes` is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                if self.is_completed() { 100.0 } else { 0.0 }
            } else {
                ((self.bytes_downloaded as f64 / total as f64) * 100.0).min(100.0)
            }
        })
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == FetchPhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(bytes: u64, total: Option<u64>) -> Progress {
        Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded: bytes,
            total_bytes: total,
        }
    }

    #[test]
    fn percentage_of_known_total() {
        assert_eq!(at(512, Some(1024)).percentage(), Some(50.0));
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(at(2048, Some(1024)).percentage(), Some(100.0));
    }

    #[test]
    fn percentage_unknown_total() {
        assert_eq!(at(10, None).percentage(), None);
    }

    #[test]
    fn empty_total_reports_zero_until_completed() {
        assert_eq!(at(0, Some(0)).percentage(), Some(0.0));
        let done = Progress { phase: FetchPhase::Completed, ..at(0, Some(0)) };
        assert_eq!(done.percentage(), Some(100.0));
    }
}
