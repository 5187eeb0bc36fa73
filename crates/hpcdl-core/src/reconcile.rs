//! Batch result sets and the final reconciliation across passes.

/// Outcome of one pass of the batch runner over a set of URLs.
///
/// Owned exclusively by the collector of the pass that produced it;
/// entries are appended in completion order.
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    /// (url, message) for downloads that completed or were skipped.
    pub success: Vec<(String, String)>,
    /// (url, error) for downloads that exhausted their retries.
    pub failed: Vec<(String, String)>,
    /// URLs with no outcome yet.
    pub pending: Vec<String>,
}

impl BatchResults {
    pub fn with_pending(urls: &[String]) -> Self {
        Self {
            pending: urls.to_vec(),
            ..Self::default()
        }
    }

    /// Failed URLs, deduplicated, in first-failure order. Input for the
    /// aggressive retry pass.
    pub fn failed_urls(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.failed
            .iter()
            .filter(|(url, _)| seen.insert(url.clone()))
            .map(|(url, _)| url.clone())
            .collect()
    }
}

/// Final success/failure partition after both passes.
#[derive(Debug, Clone, Default)]
pub struct FinalResults {
    pub success: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
}

/// Merges the initial pass with the (optional) aggressive retry pass.
///
/// Retry successes join the final success list. An initial failure is
/// dropped if the retry pass succeeded on it, replaced with the retry
/// error if it failed again (latest wins), and kept with its original
/// error if the retry pass somehow produced no verdict for it.
pub fn reconcile(initial: BatchResults, retry: Option<BatchResults>) -> FinalResults {
    let Some(retry) = retry else {
        return FinalResults {
            success: initial.success,
            failed: initial.failed,
        };
    };

    let newly_succeeded: Vec<String> = retry.success.iter().map(|(url, _)| url.clone()).collect();

    let mut success = initial.success;
    success.extend(retry.success);

    let mut failed = Vec::new();
    for (url, initial_error) in initial.failed {
        if newly_succeeded.iter().any(|u| u == &url) {
            continue;
        }
        match retry.failed.iter().find(|(u, _)| u == &url) {
            Some((_, retry_error)) => failed.push((url, retry_error.clone())),
            // No retry verdict for this URL; keep the original failure.
            None => failed.push((url, initial_error)),
        }
    }

    tracing::info!(
        "reconciled results: {} succeeded/skipped, {} permanently failed",
        success.len(),
        failed.len()
    );
    FinalResults { success, failed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, msg: &str) -> (String, String) {
        (url.to_string(), msg.to_string())
    }

    #[test]
    fn no_retry_pass_keeps_initial_results() {
        let initial = BatchResults {
            success: vec![entry("u1", "ok")],
            failed: vec![entry("u2", "boom")],
            pending: vec![],
        };
        let merged = reconcile(initial, None);
        assert_eq!(merged.success, vec![entry("u1", "ok")]);
        assert_eq!(merged.failed, vec![entry("u2", "boom")]);
    }

    #[test]
    fn retry_success_moves_url_out_of_failed() {
        let initial = BatchResults {
            success: vec![entry("u1", "ok")],
            failed: vec![entry("u2", "initial error")],
            pending: vec![],
        };
        let retry = BatchResults {
            success: vec![entry("u2", "Completed, Size: 1.00 MB")],
            failed: vec![],
            pending: vec![],
        };
        let merged = reconcile(initial, Some(retry));
        assert_eq!(merged.success.len(), 2);
        assert!(merged.failed.is_empty());
        assert!(merged.success.iter().any(|(u, _)| u == "u2"));
    }

    #[test]
    fn double_failure_keeps_the_retry_error() {
        let initial = BatchResults {
            success: vec![],
            failed: vec![entry("u1", "initial error")],
            pending: vec![],
        };
        let retry = BatchResults {
            success: vec![],
            failed: vec![entry("u1", "aggressive error")],
            pending: vec![],
        };
        let merged = reconcile(initial, Some(retry));
        assert_eq!(merged.failed, vec![entry("u1", "aggressive error")]);
    }

    #[test]
    fn missing_retry_verdict_keeps_original_error() {
        let initial = BatchResults {
            success: vec![],
            failed: vec![entry("u1", "initial error")],
            pending: vec![],
        };
        let retry = BatchResults::default();
        let merged = reconcile(initial, Some(retry));
        assert_eq!(merged.failed, vec![entry("u1", "initial error")]);
    }

    #[test]
    fn every_url_lands_in_exactly_one_partition() {
        let initial = BatchResults {
            success: vec![entry("u1", "ok")],
            failed: vec![entry("u2", "e2"), entry("u3", "e3")],
            pending: vec![],
        };
        let retry = BatchResults {
            success: vec![entry("u2", "ok now")],
            failed: vec![entry("u3", "still broken")],
            pending: vec![],
        };
        let merged = reconcile(initial, Some(retry));
        for url in ["u1", "u2", "u3"] {
            let in_success = merged.success.iter().any(|(u, _)| u == url);
            let in_failed = merged.failed.iter().any(|(u, _)| u == url);
            assert!(in_success ^ in_failed, "{url} must be in exactly one list");
        }
    }

    #[test]
    fn failed_urls_dedups_preserving_order() {
        let results = BatchResults {
            success: vec![],
            failed: vec![entry("u2", "a"), entry("u1", "b"), entry("u2", "c")],
            pending: vec![],
        };
        assert_eq!(results.failed_urls(), vec!["u2", "u1"]);
    }
}
