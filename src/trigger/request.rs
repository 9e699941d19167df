//! Capture requests handed to the external save routine.

use crate::decision::Verdict;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Origin of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Auto,
    Manual,
}

/// Instruction to snapshot the current frame.
///
/// Drawing the overlay, encoding and persisting the image belong to the
/// caller; this only carries what should be stamped on it.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRequest {
    pub kind: CaptureKind,
    pub verdict: Verdict,
    /// Sequence number of the frame the verdict was computed from.
    pub frame_sequence: u64,
    pub taken_at: DateTime<Local>,
}

impl CaptureRequest {
    pub fn new(kind: CaptureKind, verdict: Verdict, frame_sequence: u64) -> Self {
        Self::at(kind, verdict, frame_sequence, Local::now())
    }

    pub fn at(
        kind: CaptureKind,
        verdict: Verdict,
        frame_sequence: u64,
        taken_at: DateTime<Local>,
    ) -> Self {
        Self {
            kind,
            verdict,
            frame_sequence,
            taken_at,
        }
    }

    /// Text burned into the image's footer bar.
    pub fn caption(&self) -> String {
        format!(
            "{}  {}",
            self.taken_at.format("%Y/%m/%d %H:%M:%S"),
            self.verdict.mark()
        )
    }

    /// Suggested JPEG file name.
    pub fn file_name(&self) -> String {
        let mark: String = self
            .verdict
            .mark()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        format!("lamp_{}_{}.jpg", self.taken_at.format("%Y%m%d_%H%M%S"), mark)
    }
}
