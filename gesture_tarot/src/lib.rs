//! # gesture_tarot
//!
//! A tarot table driven by hand gestures.  The user states a question,
//! picks a spread, and draws one card per slot: pull it closer with a
//! pinch, reveal it with a fist, and once the spread is full an oracle
//! writes a single interpretation of the whole reading.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Detection | Action |
//! |---|---|---|
//! | Open palm | fingertips extended | Card floats gently |
//! | Pinch | thumb tip near index tip | Card follows the hand toward the camera |
//! | Fist | all fingertips curled to the wrist | Card latches with its orientation (a reversed card rolls 180°), ash bursts, confirms after 1 s |
//! | No hand | detector reports nothing | Gesture cleared, card holds still |
//!
//! ## Input sources
//!
//! * **Hand tracker**: an external landmark detector process, configured in
//!   `[tracker]`, streaming one JSON line per frame.
//! * **Mouse** (fallback): move = open palm, button down = pinch,
//!   button up = fist.  Used whenever the tracker is missing or dies.
//! * **Console** (headless): `move x y`, `down x y`, `up x y`, plus
//!   `ok`, `lang`, `restart`, `quit`.
//!
//! ## Window keys
//!
//! | Key | Action |
//! |---|---|
//! | `Enter` / `Space` | Dismiss the gesture tutorial |
//! | `L` | Toggle language |
//! | `R` | Restart with the same question |
//! | `Q` / `Escape` | Quit |

pub mod gesture;
pub mod tracker;
pub mod clock;
pub mod particles;
pub mod card;
pub mod tutorial;
pub mod session;
pub mod config;
pub mod overlay;
pub mod app;
#[cfg(feature = "window")]
pub mod visualizer;
