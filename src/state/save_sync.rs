//! Save bookkeeping for the metadata file.
//!
//! At most one save is in flight. Requests arriving while one is running
//! replace any queued request, so only the latest content is written next.
//! `pending_saves` counts the in-flight and queued saves together.

/// Banner text shown when saving did not succeed.
pub const SAVE_FAILED_MESSAGE: &str =
    "Error when saving the labels. The last changes were not saved in the CSV file.";

/// One write of the full CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveJob {
    /// Increasing per request; identifies the job's outcome
    pub generation: u64,
    pub path: String,
    pub content: String,
}

/// Outcome of a [`SaveJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    pub generation: u64,
    pub result: Result<(), String>,
}

/// What the caller has to do after a save finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveCompletion {
    /// Queued job to submit now
    pub next: Option<SaveJob>,
    /// Error to surface to the user
    pub error: Option<String>,
}

/// Tracks in-flight and queued saves and their success.
#[derive(Debug, Clone)]
pub struct SaveSync {
    next_generation: u64,
    in_flight: Option<u64>,
    queued: Option<SaveJob>,
    pending_saves: usize,
    last_save_success: bool,
}

impl Default for SaveSync {
    fn default() -> Self {
        Self {
            next_generation: 1,
            in_flight: None,
            queued: None,
            pending_saves: 0,
            last_save_success: true,
        }
    }
}

impl SaveSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves in flight or queued.
    pub fn pending_saves(&self) -> usize {
        self.pending_saves
    }

    /// Whether the most recent finished save succeeded.
    pub fn last_save_success(&self) -> bool {
        self.last_save_success
    }

    /// Whether a save is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Ask for `content` to be written to `path`.
    ///
    /// Returns the job to submit right away, or `None` if it was queued
    /// behind the running save.
    pub fn request(&mut self, path: &str, content: String) -> Option<SaveJob> {
        let job = SaveJob {
            generation: self.next_generation,
            path: path.to_string(),
            content,
        };
        self.next_generation += 1;

        if self.in_flight.is_some() {
            if self.queued.is_none() {
                self.pending_saves += 1;
            }
            log::debug!("💾 Save #{} queued", job.generation);
            self.queued = Some(job);
            return None;
        }

        self.pending_saves += 1;
        self.in_flight = Some(job.generation);
        log::debug!("💾 Save #{} submitted", job.generation);
        Some(job)
    }

    /// Record the outcome of the running save.
    ///
    /// The user-facing error is reported only when no saves remain pending
    /// and the last one failed, so a burst of failing saves yields a single
    /// report.
    pub fn complete(&mut self, outcome: SaveResult) -> SaveCompletion {
        if self.in_flight != Some(outcome.generation) {
            log::warn!("Ignoring outcome of unknown save #{}", outcome.generation);
            return SaveCompletion::default();
        }
        self.in_flight = None;
        self.pending_saves = self.pending_saves.saturating_sub(1);

        match &outcome.result {
            Ok(()) => {
                self.last_save_success = true;
                log::info!("💾 Save #{} written", outcome.generation);
            }
            Err(message) => {
                self.last_save_success = false;
                log::error!("Save #{} failed: {}", outcome.generation, message);
            }
        }

        let next = self.queued.take();
        if let Some(job) = &next {
            self.in_flight = Some(job.generation);
            log::debug!("💾 Save #{} submitted", job.generation);
        }

        let error = (self.pending_saves == 0 && !self.last_save_success)
            .then(|| SAVE_FAILED_MESSAGE.to_string());
        SaveCompletion { next, error }
    }

    /// Forget every pending save, e.g. after the dataset was replaced.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.queued = None;
        self.pending_saves = 0;
        self.last_save_success = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(generation: u64) -> SaveResult {
        SaveResult {
            generation,
            result: Ok(()),
        }
    }

    fn failed(generation: u64) -> SaveResult {
        SaveResult {
            generation,
            result: Err("disk full".to_string()),
        }
    }

    #[test]
    fn test_single_save_success() {
        let mut sync = SaveSync::new();
        let job = sync.request("/m.csv", "a".to_string()).expect("submitted");
        assert_eq!(sync.pending_saves(), 1);
        let done = sync.complete(ok(job.generation));
        assert_eq!(done, SaveCompletion::default());
        assert_eq!(sync.pending_saves(), 0);
        assert!(sync.last_save_success());
    }

    #[test]
    fn test_requests_coalesce_behind_running_save() {
        let mut sync = SaveSync::new();
        let first = sync.request("/m.csv", "1".to_string()).expect("submitted");
        assert!(sync.request("/m.csv", "2".to_string()).is_none());
        assert!(sync.request("/m.csv", "3".to_string()).is_none());
        assert_eq!(sync.pending_saves(), 2);

        let done = sync.complete(ok(first.generation));
        let next = done.next.expect("queued job");
        assert_eq!(next.content, "3");
        assert_eq!(sync.pending_saves(), 1);
        assert!(sync.is_busy());

        sync.complete(ok(next.generation));
        assert_eq!(sync.pending_saves(), 0);
        assert!(!sync.is_busy());
    }

    #[test]
    fn test_error_reported_once_when_idle() {
        let mut sync = SaveSync::new();
        let first = sync.request("/m.csv", "1".to_string()).expect("submitted");
        sync.request("/m.csv", "2".to_string());

        let done = sync.complete(failed(first.generation));
        assert!(done.error.is_none());
        assert!(!sync.last_save_success());

        let second = done.next.expect("queued job");
        let done = sync.complete(failed(second.generation));
        assert_eq!(done.error.as_deref(), Some(SAVE_FAILED_MESSAGE));
    }

    #[test]
    fn test_later_success_clears_failure() {
        let mut sync = SaveSync::new();
        let first = sync.request("/m.csv", "1".to_string()).expect("submitted");
        sync.request("/m.csv", "2".to_string());

        let done = sync.complete(failed(first.generation));
        let done = sync.complete(ok(done.next.expect("queued").generation));
        assert!(done.error.is_none());
        assert!(sync.last_save_success());
    }

    #[test]
    fn test_unknown_outcome_ignored() {
        let mut sync = SaveSync::new();
        let job = sync.request("/m.csv", "1".to_string()).expect("submitted");
        assert_eq!(sync.complete(failed(job.generation + 10)), SaveCompletion::default());
        assert_eq!(sync.pending_saves(), 1);
        assert!(sync.last_save_success());
    }

    #[test]
    fn test_reset_forgets_pending() {
        let mut sync = SaveSync::new();
        let job = sync.request("/m.csv", "1".to_string()).expect("submitted");
        sync.request("/m.csv", "2".to_string());
        sync.reset();
        assert_eq!(sync.pending_saves(), 0);
        assert_eq!(sync.complete(ok(job.generation)), SaveCompletion::default());
        assert!(sync.request("/m.csv", "3".to_string()).is_some());
    }
}
