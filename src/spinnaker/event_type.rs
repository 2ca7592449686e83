//! Event type classification
//!
//! Spinnaker encodes the event kind as `<source>:<domain>:<status>`, e.g.
//! `orca:pipeline:complete` or `orca:stage:failed`. Segments are used verbatim;
//! no trimming or case folding happens here.

use thiserror::Error;

/// Domain that produces a duration metric
pub const PIPELINE_DOMAIN: &str = "pipeline";

pub const STATUS_STARTING: &str = "starting";
pub const STATUS_FAILED: &str = "failed";

/// The type string has fewer than three `:`-separated segments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed event type {event_type:?}: expected <source>:<domain>:<status>, got {segments} segment(s)")]
pub struct MalformedEventType {
    pub event_type: String,
    pub segments: usize,
}

/// `(domain, status)` decoded from an event type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub domain: String,
    pub status: String,
}

impl ClassifiedEvent {
    pub fn is_pipeline(&self) -> bool {
        self.domain == PIPELINE_DOMAIN
    }

    pub fn is_starting(&self) -> bool {
        self.status == STATUS_STARTING
    }

    pub fn is_failed(&self) -> bool {
        self.status == STATUS_FAILED
    }
}

/// Decode `<source>:<domain>:<status>`.
///
/// Extra trailing segments are ignored.
pub fn classify(event_type: &str) -> Result<ClassifiedEvent, MalformedEventType> {
    let segments: Vec<&str> = event_type.split(':').collect();
    if segments.len() < 3 {
        return Err(MalformedEventType {
            event_type: event_type.to_string(),
            // "".split(':') yields one empty segment
            segments: if event_type.is_empty() { 0 } else { segments.len() },
        });
    }

    Ok(ClassifiedEvent {
        domain: segments[1].to_string(),
        status: segments[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stage_failed() {
        let classified = classify("orca:stage:failed").unwrap();
        assert_eq!(classified.domain, "stage");
        assert_eq!(classified.status, "failed");
        assert!(classified.is_failed());
        assert!(!classified.is_pipeline());
    }

    #[test]
    fn test_classify_pipeline_starting() {
        let classified = classify("orca:pipeline:starting").unwrap();
        assert!(classified.is_pipeline());
        assert!(classified.is_starting());
    }

    #[test]
    fn test_classify_keeps_segments_verbatim() {
        let classified = classify("orca: Pipeline :COMPLETE").unwrap();
        assert_eq!(classified.domain, " Pipeline ");
        assert_eq!(classified.status, "COMPLETE");
        assert!(!classified.is_pipeline());
    }

    #[test]
    fn test_classify_ignores_extra_segments() {
        let classified = classify("igor:build:complete:extra").unwrap();
        assert_eq!(classified.domain, "build");
        assert_eq!(classified.status, "complete");
    }

    #[test]
    fn test_classify_rejects_short_types() {
        for bad in ["", "orca", "orca:pipeline"] {
            let err = classify(bad).unwrap_err();
            assert_eq!(err.event_type, bad);
            assert!(err.segments < 3);
        }
        assert_eq!(classify("").unwrap_err().segments, 0);
        assert_eq!(classify("orca:pipeline").unwrap_err().segments, 2);
    }

    #[test]
    fn test_classify_allows_empty_segments() {
        let classified = classify("::").unwrap();
        assert_eq!(classified.domain, "");
        assert_eq!(classified.status, "");
    }
}
