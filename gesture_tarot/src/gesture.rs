//! Gesture classification and input sources.
//!
//! Everything that can move the card ends up as an [`InputEvent`] on a
//! `mpsc` channel.  The app loop does not care whether an event came from
//! the hand tracker, the window's mouse, or lines typed on stdin.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use serde::Deserialize;
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// Hand landmarks
// ════════════════════════════════════════════════════════════════════════════

/// MediaPipe hand landmark indices used by the classifier.
pub mod landmarks {
    pub const WRIST:      usize = 0;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_TIP:  usize = 20;

    /// Points per hand.
    pub const COUNT: usize = 21;
}

/// One keypoint in normalized image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Planar distance; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The 21 landmarks of a single detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    pub landmarks: [Landmark; landmarks::COUNT],
}

impl HandFrame {
    /// `None` unless exactly 21 points are supplied.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; landmarks::COUNT] = points.try_into().ok()?;
        Some(HandFrame { landmarks })
    }

    pub fn point(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    /// The pointer position is the index fingertip.
    pub fn index_tip(&self) -> &Landmark {
        self.point(landmarks::INDEX_TIP)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Thumb/index tip distance below which the hand is pinching.
pub const PINCH_THRESHOLD: f32 = 0.06;

/// Tip-to-wrist distance below which a finger counts as curled.
pub const CURL_THRESHOLD: f32 = 0.22;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Open,
    Pinch,
    Fist,
    Point,
}

impl Gesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::None  => "NONE",
            Gesture::Open  => "OPEN",
            Gesture::Pinch => "PINCH",
            Gesture::Fist  => "FIST",
            Gesture::Point => "POINT",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one frame.  First match wins: pinch, fist, point, open.
pub fn classify(frame: &HandFrame) -> Gesture {
    use landmarks::*;

    let wrist = frame.point(WRIST);
    let closed = |tip: usize| frame.point(tip).distance_2d(wrist) < CURL_THRESHOLD;

    if frame.point(THUMB_TIP).distance_2d(frame.point(INDEX_TIP)) < PINCH_THRESHOLD {
        return Gesture::Pinch;
    }

    let others_closed = closed(MIDDLE_TIP) && closed(RING_TIP) && closed(PINKY_TIP);
    match (closed(INDEX_TIP), others_closed) {
        (true, true)  => Gesture::Fist,
        (false, true) => Gesture::Point,
        _             => Gesture::Open,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

/// A gesture at a normalized screen position, `(0,0)` top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSignal {
    pub gesture: Gesture,
    pub x:       f32,
    pub y:       f32,
}

impl PointerSignal {
    pub fn new(gesture: Gesture, x: f32, y: f32) -> Self {
        PointerSignal { gesture, x, y }
    }
}

/// Non-gesture controls (keyboard in the window, words on stdin).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    DismissTutorial,
    ToggleLocale,
    Restart,
    Quit,
}

/// What the app loop receives.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Pointer(PointerSignal),
    /// The tracker saw a frame with no usable hand.
    NoHand,
    Command(UiCommand),
    /// The tracker process ended; the app switches to the pointer fallback.
    TrackerLost(String),
}

/// Raw pointer activity, before it becomes a gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Move { x: f32, y: f32 },
    Down { x: f32, y: f32 },
    Up   { x: f32, y: f32 },
    Command(UiCommand),
}

impl PointerInput {
    /// Mouse fallback mapping: move → open, down → pinch, up → fist.
    pub fn to_event(self) -> InputEvent {
        let clamp = |v: f32| v.clamp(0.0, 1.0);
        match self {
            PointerInput::Move { x, y } =>
                InputEvent::Pointer(PointerSignal::new(Gesture::Open,  clamp(x), clamp(y))),
            PointerInput::Down { x, y } =>
                InputEvent::Pointer(PointerSignal::new(Gesture::Pinch, clamp(x), clamp(y))),
            PointerInput::Up { x, y } =>
                InputEvent::Pointer(PointerSignal::new(Gesture::Fist,  clamp(x), clamp(y))),
            PointerInput::Command(cmd) => InputEvent::Command(cmd),
        }
    }

    /// Parse one console line: `move x y`, `down x y`, `up x y`, or one of
    /// `ok`, `lang`, `restart`, `quit`.
    pub fn parse(line: &str) -> Option<PointerInput> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_ascii_lowercase();

        let command = match verb.as_str() {
            "ok" | "got" | "dismiss" => Some(UiCommand::DismissTutorial),
            "lang" | "locale"        => Some(UiCommand::ToggleLocale),
            "restart" | "again"      => Some(UiCommand::Restart),
            "quit" | "q" | "exit"    => Some(UiCommand::Quit),
            _ => None,
        };
        if let Some(cmd) = command {
            return Some(PointerInput::Command(cmd));
        }

        let x: f32 = words.next()?.parse().ok()?;
        let y: f32 = words.next()?.parse().ok()?;
        match verb.as_str() {
            "move" => Some(PointerInput::Move { x, y }),
            "down" => Some(PointerInput::Down { x, y }),
            "up"   => Some(PointerInput::Up   { x, y }),
            _      => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — tracker, window and console behind one interface
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`InputEvent`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<InputEvent>);
}

/// Run a source on its own thread, feeding `tx`.
pub fn spawn_gesture_source<G: GestureSource>(source: G, tx: Sender<InputEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(tx))
}

// ────────────────────────────────────────────────────────────────────────────
// PointerGestureSource — the mouse fallback
// ────────────────────────────────────────────────────────────────────────────

/// Translates [`PointerInput`] from the window into gesture events.
pub struct PointerGestureSource {
    pub rx: Receiver<PointerInput>,
}

impl GestureSource for PointerGestureSource {
    fn run(self: Box<Self>, tx: Sender<InputEvent>) {
        for input in self.rx {
            let quit = input == PointerInput::Command(UiCommand::Quit);
            if tx.send(input.to_event()).is_err() || quit {
                return;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ConsoleSource — headless pointer events from stdin
// ────────────────────────────────────────────────────────────────────────────

/// Reads pointer lines from stdin.  End of input is treated as quit.
pub struct ConsoleSource;

impl GestureSource for ConsoleSource {
    fn run(self: Box<Self>, tx: Sender<InputEvent>) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match PointerInput::parse(&line) {
                Some(input) => {
                    let quit = input == PointerInput::Command(UiCommand::Quit);
                    if tx.send(input.to_event()).is_err() || quit {
                        return;
                    }
                }
                None if line.trim().is_empty() => {}
                None => debug!(line = %line.trim(), "ignoring console input"),
            }
        }
        let _ = tx.send(InputEvent::Command(UiCommand::Quit));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use landmarks::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::mpsc;

    /// An open hand: every tip far from the wrist, thumb far from index.
    pub(crate) fn open_hand() -> HandFrame {
        let mut pts = [Landmark::new(0.5, 0.9); COUNT];
        pts[THUMB_TIP]  = Landmark::new(0.25, 0.55);
        pts[INDEX_TIP]  = Landmark::new(0.40, 0.40);
        pts[MIDDLE_TIP] = Landmark::new(0.50, 0.35);
        pts[RING_TIP]   = Landmark::new(0.60, 0.40);
        pts[PINKY_TIP]  = Landmark::new(0.70, 0.50);
        HandFrame { landmarks: pts }
    }

    fn curl(frame: &mut HandFrame, tip: usize) {
        frame.landmarks[tip] = Landmark::new(0.52, 0.80);
    }

    pub(crate) fn fist() -> HandFrame {
        let mut f = open_hand();
        for tip in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP] {
            curl(&mut f, tip);
        }
        f
    }

    pub(crate) fn pinch() -> HandFrame {
        let mut f = open_hand();
        f.landmarks[THUMB_TIP] = Landmark::new(0.42, 0.42);
        f
    }

    #[test]
    fn canonical_shapes() {
        assert_eq!(classify(&open_hand()), Gesture::Open);
        assert_eq!(classify(&fist()), Gesture::Fist);
        assert_eq!(classify(&pinch()), Gesture::Pinch);

        let mut point = fist();
        point.landmarks[INDEX_TIP] = Landmark::new(0.45, 0.30);
        assert_eq!(classify(&point), Gesture::Point);
    }

    #[test]
    fn pinch_wins_over_everything() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let mut pts = [Landmark::default(); COUNT];
            for p in pts.iter_mut() {
                *p = Landmark::new(rng.gen(), rng.gen());
            }
            let index = pts[INDEX_TIP];
            let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let r: f32 = rng.gen_range(0.0..PINCH_THRESHOLD * 0.99);
            pts[THUMB_TIP] = Landmark::new(index.x + r * angle.cos(), index.y + r * angle.sin());
            assert_eq!(classify(&HandFrame { landmarks: pts }), Gesture::Pinch);
        }
    }

    #[test]
    fn fist_requires_all_four_tips_curled() {
        for tip in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP] {
            let mut f = fist();
            f.landmarks[tip] = Landmark::new(0.9, 0.2);
            assert_ne!(classify(&f), Gesture::Fist, "tip {tip}");
        }
    }

    #[test]
    fn random_frames_follow_priority() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let mut pts = [Landmark::default(); COUNT];
            for p in pts.iter_mut() {
                *p = Landmark::new(rng.gen_range(0.3..0.7), rng.gen_range(0.3..0.7));
            }
            let f = HandFrame { landmarks: pts };
            let wrist = f.point(WRIST);
            let closed = |t: usize| f.point(t).distance_2d(wrist) < CURL_THRESHOLD;
            let pinching = f.point(THUMB_TIP).distance_2d(f.point(INDEX_TIP)) < PINCH_THRESHOLD;
            let rest = closed(MIDDLE_TIP) && closed(RING_TIP) && closed(PINKY_TIP);

            let expected = if pinching {
                Gesture::Pinch
            } else if closed(INDEX_TIP) && rest {
                Gesture::Fist
            } else if rest {
                Gesture::Point
            } else {
                Gesture::Open
            };
            assert_eq!(classify(&f), expected);
        }
    }

    #[test]
    fn frame_needs_21_points() {
        assert!(HandFrame::from_slice(&[Landmark::default(); 20]).is_none());
        assert!(HandFrame::from_slice(&[Landmark::default(); 21]).is_some());
    }

    #[test]
    fn console_lines() {
        assert_eq!(PointerInput::parse("move 0.5 0.25"),
                   Some(PointerInput::Move { x: 0.5, y: 0.25 }));
        assert_eq!(PointerInput::parse("DOWN 1 0"),
                   Some(PointerInput::Down { x: 1.0, y: 0.0 }));
        assert_eq!(PointerInput::parse("up 0.1 0.9"),
                   Some(PointerInput::Up { x: 0.1, y: 0.9 }));
        assert_eq!(PointerInput::parse("ok"),
                   Some(PointerInput::Command(UiCommand::DismissTutorial)));
        assert_eq!(PointerInput::parse("move 0.5"), None);
        assert_eq!(PointerInput::parse("jump 1 1"), None);
        assert_eq!(PointerInput::parse(""), None);
    }

    #[test]
    fn mouse_mapping() {
        let ev = PointerInput::Down { x: 0.2, y: 1.4 }.to_event();
        assert_eq!(ev, InputEvent::Pointer(PointerSignal::new(Gesture::Pinch, 0.2, 1.0)));
        let ev = PointerInput::Up { x: 0.3, y: 0.3 }.to_event();
        assert!(matches!(ev, InputEvent::Pointer(PointerSignal { gesture: Gesture::Fist, .. })));
        let ev = PointerInput::Move { x: 0.3, y: 0.3 }.to_event();
        assert!(matches!(ev, InputEvent::Pointer(PointerSignal { gesture: Gesture::Open, .. })));
    }

    #[test]
    fn pointer_source_forwards_until_quit() {
        let (in_tx, in_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        in_tx.send(PointerInput::Move { x: 0.5, y: 0.5 }).unwrap();
        in_tx.send(PointerInput::Command(UiCommand::Quit)).unwrap();
        in_tx.send(PointerInput::Down { x: 0.5, y: 0.5 }).unwrap();

        spawn_gesture_source(PointerGestureSource { rx: in_rx }, out_tx).join().unwrap();

        let events: Vec<_> = out_rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], InputEvent::Command(UiCommand::Quit));
    }
}
