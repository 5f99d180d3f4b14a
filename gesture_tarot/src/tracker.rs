//! Hand tracking through an external landmark detector process.
//!
//! The detector owns the camera.  It prints `READY` once its model is
//! loaded, then one JSON object per processed frame:
//!
//! ```text
//! {"hands":[{"handedness":"Right","score":0.93,"landmarks":[{"x":..,"y":..,"z":..}, ...]}],"error":null}
//! ```
//!
//! The first hand at or above the confidence threshold is classified and
//! its index fingertip becomes the pointer position.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::Sender;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gesture::{classify, GestureSource, HandFrame, InputEvent, Landmark, PointerSignal};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no hand tracker command configured")]
    NotConfigured,

    #[error("failed to start hand tracker '{command}': {source}")]
    Spawn { command: String, source: io::Error },

    #[error("hand tracker did not signal ready, got: {0:?}")]
    NotReady(String),

    #[error("hand tracker i/o: {0}")]
    Io(#[from] io::Error),

    #[error("malformed detection line: {0}")]
    Parse(String),

    #[error("detector reported: {0}")]
    Detector(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    score:      f32,
    landmarks:  Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one detector line into the first confident hand, if any.
pub fn parse_detection(line: &str, min_confidence: f32) -> Result<Option<HandFrame>, TrackerError> {
    let detection: DetectionJson = serde_json::from_str(line)
        .map_err(|e| TrackerError::Parse(e.to_string()))?;

    if let Some(error) = detection.error {
        return Err(TrackerError::Detector(error));
    }

    for hand in detection.hands {
        if hand.score < min_confidence {
            continue;
        }
        match HandFrame::from_slice(&hand.landmarks) {
            Some(frame) => {
                debug!(handedness = %hand.handedness, score = hand.score, "hand detected");
                return Ok(Some(frame));
            }
            None => warn!(count = hand.landmarks.len(), "expected 21 landmarks"),
        }
    }
    Ok(None)
}

/// The event one detector line turns into.
pub fn detection_event(line: &str, min_confidence: f32) -> Option<InputEvent> {
    match parse_detection(line, min_confidence) {
        Ok(Some(frame)) => {
            let tip = frame.index_tip();
            Some(InputEvent::Pointer(PointerSignal::new(classify(&frame), tip.x, tip.y)))
        }
        Ok(None) => Some(InputEvent::NoHand),
        Err(TrackerError::Detector(e)) => {
            warn!(error = %e, "detector error");
            Some(InputEvent::NoHand)
        }
        Err(e) => {
            debug!(error = %e, "skipping detector line");
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker — the child process
// ════════════════════════════════════════════════════════════════════════════

pub struct HandTracker {
    process:        Child,
    stdout:         BufReader<ChildStdout>,
    min_confidence: f32,
}

impl HandTracker {
    /// Start the detector and wait for its `READY` line.
    pub fn start(command: &str, args: &[String], min_confidence: f32) -> Result<Self, TrackerError> {
        if command.trim().is_empty() {
            return Err(TrackerError::NotConfigured);
        }

        info!(%command, "starting hand tracker");
        let mut process = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| TrackerError::Spawn { command: command.to_string(), source })?;

        let stdout = process.stdout.take()
            .ok_or_else(|| TrackerError::NotReady("stdout unavailable".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            return Err(TrackerError::NotReady(ready.trim().to_string()));
        }

        info!("hand tracker ready");
        Ok(HandTracker {
            process,
            stdout,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

impl GestureSource for HandTracker {
    fn run(mut self: Box<Self>, tx: Sender<InputEvent>) {
        let mut line = String::new();
        loop {
            line.clear();
            let reason = match self.stdout.read_line(&mut line) {
                Ok(0)  => "hand tracker exited".to_string(),
                Ok(_)  => {
                    if let Some(event) = detection_event(&line, self.min_confidence) {
                        if tx.send(event).is_err() { return; }
                    }
                    continue;
                }
                Err(e) => format!("hand tracker read failed: {e}"),
            };
            warn!(%reason, "falling back to pointer input");
            let _ = tx.send(InputEvent::TrackerLost(reason));
            return;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::{fist, open_hand};
    use crate::gesture::Gesture;

    fn line_for(frames: &[(&HandFrame, f32)]) -> String {
        let hands: Vec<_> = frames.iter().map(|(f, score)| {
            let pts: Vec<_> = f.landmarks.iter()
                .map(|l| serde_json::json!({"x": l.x, "y": l.y, "z": l.z}))
                .collect();
            serde_json::json!({"handedness": "Right", "score": score, "landmarks": pts})
        }).collect();
        serde_json::json!({"hands": hands, "error": null}).to_string()
    }

    #[test]
    fn first_confident_hand_is_used() {
        let open = open_hand();
        let closed = fist();
        let line = line_for(&[(&open, 0.3), (&closed, 0.9)]);

        let frame = parse_detection(&line, 0.5).unwrap().unwrap();
        assert_eq!(classify(&frame), Gesture::Fist);
    }

    #[test]
    fn zero_hands_is_no_hand() {
        let line = r#"{"hands":[],"error":null}"#;
        assert!(parse_detection(line, 0.5).unwrap().is_none());
        assert_eq!(detection_event(line, 0.5), Some(InputEvent::NoHand));
    }

    #[test]
    fn short_landmark_list_is_skipped() {
        let line = r#"{"hands":[{"handedness":"Left","score":0.99,"landmarks":[{"x":0.1,"y":0.1}]}]}"#;
        assert!(parse_detection(line, 0.5).unwrap().is_none());
    }

    #[test]
    fn detector_error_is_reported() {
        let line = r#"{"hands":[],"error":"camera busy"}"#;
        assert!(matches!(parse_detection(line, 0.5), Err(TrackerError::Detector(_))));
        assert_eq!(detection_event(line, 0.5), Some(InputEvent::NoHand));
    }

    #[test]
    fn garbage_line_is_dropped() {
        assert!(matches!(parse_detection("hello", 0.5), Err(TrackerError::Parse(_))));
        assert_eq!(detection_event("hello", 0.5), None);
    }

    #[test]
    fn pointer_follows_index_tip() {
        let open = open_hand();
        let line = line_for(&[(&open, 0.8)]);
        match detection_event(&line, 0.5) {
            Some(InputEvent::Pointer(sig)) => {
                assert_eq!(sig.gesture, Gesture::Open);
                assert!((sig.x - 0.40).abs() < 1e-6);
                assert!((sig.y - 0.40).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_command_is_not_configured() {
        assert!(matches!(HandTracker::start("  ", &[], 0.5), Err(TrackerError::NotConfigured)));
    }
}
