//! Top-level application state and the main loop.
//!
//! `AppState` owns the [`DrawSession`] and the [`CardController`] and routes
//! between them: input events go to the controller, confirmations go to
//! the session, and session commands come back as card presentations or
//! interpretation requests.  Everything here runs on the main thread; the
//! only async work is the oracle call, handled by
//! [`InterpretationDispatcher`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tarot_deck::{Catalog, Locale, Spread};
use tarot_oracle::{Oracle, Reading};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::card::CardController;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::gesture::{spawn_gesture_source, ConsoleSource, InputEvent, UiCommand};
use crate::overlay::{InputMode, Narrator, SessionView};
use crate::session::{DrawSession, Phase, SessionCommand, SessionError};
use crate::tracker::HandTracker;

/// An interpretation to fetch, tagged so stale answers can be dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingRequest {
    pub seq:     u64,
    pub reading: Reading,
    pub locale:  Locale,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<C: Clock, R: Rng> {
    session:    DrawSession<R>,
    controller: CardController<C, R>,

    locale:         Locale,
    mode:           InputMode,
    has_credential: bool,

    // ── kept for restart ─────────────────────────────────────────────────
    question: String,
    spread:   Option<Spread>,

    /// Sequence number of the newest interpretation request.
    reading_seq: u64,
    quit:        bool,
}

impl<C: Clock, R: Rng> AppState<C, R> {
    pub fn new(
        session:        DrawSession<R>,
        controller:     CardController<C, R>,
        locale:         Locale,
        mode:           InputMode,
        has_credential: bool,
    ) -> Self {
        AppState {
            session,
            controller,
            locale,
            mode,
            has_credential,
            question:    String::new(),
            spread:      None,
            reading_seq: 0,
            quit:        false,
        }
    }

    /// Leave `Setup` with the user's intent.
    pub fn begin(&mut self, question: &str, spread: &Spread) -> Result<(), SessionError> {
        let cmd = self.session.start_drawing(question, spread)?;
        self.question = question.trim().to_string();
        self.spread = Some(*spread);
        self.route(cmd);
        Ok(())
    }

    fn route(&mut self, cmd: SessionCommand) -> Option<ReadingRequest> {
        match cmd {
            SessionCommand::PresentCard(card) => {
                self.controller.present_card(card);
                None
            }
            SessionCommand::ShowTutorial => {
                debug!("tutorial shown");
                None
            }
            SessionCommand::RequestInterpretation(reading) => {
                self.controller.reset();
                self.reading_seq += 1;
                info!(seq = self.reading_seq, "interpretation requested");
                Some(ReadingRequest { seq: self.reading_seq, reading, locale: self.locale })
            }
            SessionCommand::Nothing => None,
        }
    }

    fn log_and_route(&mut self, result: Result<SessionCommand, SessionError>) -> Option<ReadingRequest> {
        match result {
            Ok(cmd) => self.route(cmd),
            Err(e) => {
                warn!(error = %e, "session rejected transition");
                None
            }
        }
    }

    // ── process one InputEvent ────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) -> Option<ReadingRequest> {
        match event {
            InputEvent::Pointer(sig) => {
                if self.session.phase() == Phase::Drawing && !self.session.awaiting_tutorial() {
                    self.controller.apply_pointer_signal(sig.gesture, sig.x, sig.y);
                }
                None
            }
            InputEvent::NoHand => {
                self.controller.clear_gesture();
                None
            }
            InputEvent::TrackerLost(reason) => {
                warn!(%reason, "hand tracking lost, switching to pointer input");
                self.mode = InputMode::Pointer;
                self.controller.clear_gesture();
                None
            }
            InputEvent::Command(UiCommand::DismissTutorial) => {
                let result = self.session.dismiss_tutorial();
                self.log_and_route(result)
            }
            InputEvent::Command(UiCommand::ToggleLocale) => {
                self.locale = self.locale.toggled();
                info!(locale = %self.locale, "locale changed");
                None
            }
            InputEvent::Command(UiCommand::Restart) => self.restart(),
            InputEvent::Command(UiCommand::Quit) => {
                self.quit = true;
                None
            }
        }
    }

    /// Draw again with the same question and spread.
    pub fn restart(&mut self) -> Option<ReadingRequest> {
        let spread = self.spread?;
        self.session.reset();
        self.controller.reset();
        // Any answer still in flight belongs to the abandoned reading.
        self.reading_seq += 1;

        let question = self.question.clone();
        let result = self.session.start_drawing(&question, &spread);
        self.log_and_route(result)
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) -> Option<ReadingRequest> {
        let confirmation = self.controller.update()?;
        let result = self.session.on_card_confirmed(confirmation.card, confirmation.orientation);
        self.log_and_route(result)
    }

    /// Accept the oracle's answer for request `seq`.
    pub fn deliver_interpretation(&mut self, seq: u64, text: String) {
        if seq != self.reading_seq {
            debug!(seq, current = self.reading_seq, "dropping stale interpretation");
            return;
        }
        if let Err(e) = self.session.on_interpretation(text) {
            warn!(error = %e, "interpretation arrived out of phase");
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn session(&self)        -> &DrawSession<R>         { &self.session }
    pub fn controller(&self)     -> &CardController<C, R>   { &self.controller }
    pub fn phase(&self)          -> Phase                   { self.session.phase() }
    pub fn locale(&self)         -> Locale                  { self.locale }
    pub fn mode(&self)           -> InputMode               { self.mode }
    pub fn has_credential(&self) -> bool                    { self.has_credential }
    pub fn should_quit(&self)    -> bool                    { self.quit }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase:             self.session.phase(),
            question:          self.session.question(),
            spread:            self.session.spread(),
            drawn:             self.session.drawn(),
            presented:         self.session.presented(),
            awaiting_tutorial: self.session.awaiting_tutorial(),
            interpretation:    self.session.interpretation(),
            mode:              self.mode,
            locale:            self.locale,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InterpretationDispatcher — the async edge
// ════════════════════════════════════════════════════════════════════════════

/// Runs oracle requests on a tokio runtime and hands the text back over a
/// channel the main loop drains.
pub struct InterpretationDispatcher {
    runtime: Runtime,
    oracle:  Oracle,
    tx:      Sender<(u64, String)>,
    rx:      Receiver<(u64, String)>,
}

impl InterpretationDispatcher {
    pub fn new(oracle: Oracle) -> Result<Self> {
        let runtime = Runtime::new().context("failed to start the async runtime")?;
        let (tx, rx) = mpsc::channel();
        Ok(InterpretationDispatcher { runtime, oracle, tx, rx })
    }

    pub fn dispatch(&self, request: ReadingRequest) {
        let oracle = self.oracle.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let text = oracle.interpret(&request.reading, request.locale).await;
            let _ = tx.send((request.seq, text));
        });
    }

    pub fn try_recv(&self) -> Option<(u64, String)> {
        match self.rx.try_recv() {
            Ok(answer) => Some(answer),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<(u64, String)> {
        match self.rx.recv_timeout(timeout) {
            Ok(answer) => Some(answer),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

pub struct RunOptions {
    pub config:   AppConfig,
    pub catalog:  Catalog,
    pub question: String,
    pub spread:   Spread,
    pub locale:   Locale,
    /// Skip the hand tracker even when one is configured.
    pub pointer_only: bool,
    /// Read pointer events from stdin instead of opening a window.
    pub headless: bool,
}

const FRAME: Duration = Duration::from_millis(16);

/// Everything one frame does apart from drawing.  Returns false to stop.
fn step<C: Clock, R: Rng>(
    app:        &mut AppState<C, R>,
    events:     &Receiver<InputEvent>,
    dispatcher: &InterpretationDispatcher,
    narrator:   &mut Narrator,
) -> bool {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(request) = app.handle_input(event) {
                    dispatcher.dispatch(request);
                }
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => return false,
        }
    }

    if let Some(request) = app.tick() {
        dispatcher.dispatch(request);
    }
    while let Some((seq, text)) = dispatcher.try_recv() {
        app.deliver_interpretation(seq, text);
    }

    for line in narrator.narrate(&app.view()) {
        println!("{line}");
    }
    !app.should_quit()
}

/// Run the full application.
///
/// Starts the hand tracker when one is configured (falling back to pointer
/// input when it cannot start), then drives the event/update/render loop
/// at ~60 fps until the user quits.
pub fn run(opts: RunOptions) -> Result<()> {
    let oracle = Oracle::from_config(&opts.config.oracle)
        .context("failed to build the oracle client")?;
    let has_credential = oracle.has_credential();
    let dispatcher = InterpretationDispatcher::new(oracle)?;

    let (tx, rx) = mpsc::channel::<InputEvent>();

    // ── Hand tracker, if available ────────────────────────────────────────
    let mode = match opts.config.tracker_command().filter(|_| !opts.pointer_only) {
        Some(command) => {
            match HandTracker::start(command, &opts.config.tracker.args, opts.config.tracker.min_confidence) {
                Ok(tracker) => {
                    spawn_gesture_source(tracker, tx.clone());
                    InputMode::Hand
                }
                Err(e) => {
                    warn!(error = %e, "hand tracker unavailable, using pointer input");
                    InputMode::Pointer
                }
            }
        }
        None => InputMode::Pointer,
    };

    // ── App state ─────────────────────────────────────────────────────────
    let session = DrawSession::new(opts.catalog, StdRng::from_entropy());
    let controller = CardController::new(SystemClock::new(), StdRng::from_entropy());
    let mut app = AppState::new(session, controller, opts.locale, mode, has_credential);
    app.begin(&opts.question, &opts.spread)
        .context("could not start the reading")?;

    let mut narrator = Narrator::new();

    #[cfg(feature = "window")]
    if !opts.headless {
        return run_window(app, tx, rx, dispatcher, narrator, &opts.config);
    }

    // ── Headless: pointer events from stdin ───────────────────────────────
    spawn_gesture_source(ConsoleSource, tx);
    while step(&mut app, &rx, &dispatcher, &mut narrator) {
        thread::sleep(FRAME);
    }
    Ok(())
}

#[cfg(feature = "window")]
fn run_window<C: Clock, R: Rng>(
    mut app:      AppState<C, R>,
    tx:           Sender<InputEvent>,
    rx:           Receiver<InputEvent>,
    dispatcher:   InterpretationDispatcher,
    mut narrator: Narrator,
    config:       &AppConfig,
) -> Result<()> {
    use crate::gesture::PointerGestureSource;
    use crate::visualizer::Visualizer;

    // ── Window input → pointer source → app channel ───────────────────────
    let (pointer_tx, pointer_rx) = mpsc::channel();
    spawn_gesture_source(PointerGestureSource { rx: pointer_rx }, tx);

    let (width, height) = config.display.window_size();
    let mut vis = Visualizer::new(pointer_tx, width, height)
        .map_err(anyhow::Error::msg)
        .context("failed to open the window")?;

    while vis.is_open() {
        if !vis.poll_input(app.mode()) { break; }
        if !step(&mut app, &rx, &dispatcher, &mut narrator) { break; }
        vis.render(&app);
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CONFIRM_DELAY;
    use crate::clock::ManualClock;
    use crate::gesture::{Gesture, PointerSignal};
    use crate::tutorial::SessionStorage;

    type App = AppState<ManualClock, StdRng>;

    fn make_app(seed: u64, tutorial_seen: bool) -> (App, ManualClock) {
        let clock = ManualClock::new();
        let mut storage = SessionStorage::new();
        if tutorial_seen {
            storage.mark_tutorial_seen();
        }
        let session = DrawSession::with_storage(Catalog::standard(), StdRng::seed_from_u64(seed), storage);
        let controller = CardController::new(clock.clone(), StdRng::seed_from_u64(seed + 1));
        (AppState::new(session, controller, Locale::En, InputMode::Pointer, true), clock)
    }

    fn fist() -> InputEvent {
        InputEvent::Pointer(PointerSignal::new(Gesture::Fist, 0.5, 0.5))
    }

    fn daily() -> Spread { *Catalog::standard().spread("daily").unwrap() }

    /// Fist, wait out the delay, tick.
    fn confirm(app: &mut App, clock: &ManualClock) -> Option<ReadingRequest> {
        app.handle_input(fist());
        clock.advance(CONFIRM_DELAY);
        app.tick()
    }

    #[test]
    fn pointer_is_ignored_behind_tutorial() {
        let (mut app, clock) = make_app(1, false);
        app.begin("q", &daily()).unwrap();
        assert!(app.controller().active().is_none());

        app.handle_input(fist());
        clock.advance(CONFIRM_DELAY);
        assert!(app.tick().is_none());

        app.handle_input(InputEvent::Command(UiCommand::DismissTutorial));
        assert!(app.controller().active().is_some());
    }

    #[test]
    fn last_confirmation_requests_reading() {
        let (mut app, clock) = make_app(2, true);
        app.begin("Will it rain?", &daily()).unwrap();

        let request = confirm(&mut app, &clock).unwrap();
        assert_eq!(app.phase(), Phase::Interpreting);
        assert_eq!(request.reading.cards.len(), 1);
        assert_eq!(request.locale, Locale::En);
        assert!(app.controller().active().is_none());

        app.deliver_interpretation(request.seq, "Sunshine.".into());
        assert_eq!(app.phase(), Phase::Complete);
        assert_eq!(app.session().interpretation(), Some("Sunshine."));
    }

    #[test]
    fn stale_interpretation_is_dropped_after_restart() {
        let (mut app, clock) = make_app(3, true);
        app.begin("q", &daily()).unwrap();
        let old = confirm(&mut app, &clock).unwrap();

        app.handle_input(InputEvent::Command(UiCommand::Restart));
        assert_eq!(app.phase(), Phase::Drawing);
        assert!(app.controller().active().is_some());

        app.deliver_interpretation(old.seq, "late".into());
        assert_eq!(app.phase(), Phase::Drawing);

        let new = confirm(&mut app, &clock).unwrap();
        assert_ne!(new.seq, old.seq);
    }

    #[test]
    fn tracker_loss_switches_to_pointer() {
        let (mut app, _) = make_app(4, true);
        app.mode = InputMode::Hand;
        app.handle_input(InputEvent::TrackerLost("exited".into()));
        assert_eq!(app.mode(), InputMode::Pointer);
    }

    #[test]
    fn locale_toggle_and_quit() {
        let (mut app, _) = make_app(5, true);
        app.handle_input(InputEvent::Command(UiCommand::ToggleLocale));
        assert_eq!(app.locale(), Locale::Zh);
        assert!(!app.should_quit());
        app.handle_input(InputEvent::Command(UiCommand::Quit));
        assert!(app.should_quit());
    }

    #[test]
    fn dispatcher_without_key_answers_missing_key() {
        let (mut app, clock) = make_app(6, true);
        app.begin("q", &daily()).unwrap();
        let request = confirm(&mut app, &clock).unwrap();

        let dispatcher = InterpretationDispatcher::new(Oracle::without_credential()).unwrap();
        dispatcher.dispatch(request);
        let (seq, text) = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(text, "Error: API key missing.");

        app.deliver_interpretation(seq, text);
        assert_eq!(app.phase(), Phase::Complete);
    }
}
