//! A full reading, from intent to interpretation, with a scripted oracle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gesture_tarot::app::{AppState, InterpretationDispatcher};
use gesture_tarot::card::{CardController, CONFIRM_DELAY};
use gesture_tarot::clock::ManualClock;
use gesture_tarot::gesture::{Gesture, InputEvent, PointerSignal, UiCommand};
use gesture_tarot::overlay::InputMode;
use gesture_tarot::session::{DrawSession, Phase};
use rand::{rngs::StdRng, SeedableRng};
use tarot_deck::{Catalog, Locale};
use tarot_oracle::{card_line, GenerationError, Oracle, TextGenerator};

#[derive(Default)]
struct Recording {
    calls:   AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for Recording {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("**The Essence**\nA bridge appears.\n- Walk it slowly.".to_string())
    }
}

fn signal(gesture: Gesture, x: f32, y: f32) -> InputEvent {
    InputEvent::Pointer(PointerSignal::new(gesture, x, y))
}

#[test]
fn three_card_reading_end_to_end() {
    let catalog = Catalog::standard();
    let spread = *catalog.spread("ppf").unwrap();
    let clock = ManualClock::new();

    let session = DrawSession::new(catalog, StdRng::seed_from_u64(11));
    let controller = CardController::new(clock.clone(), StdRng::seed_from_u64(12));
    let mut app = AppState::new(session, controller, Locale::En, InputMode::Pointer, true);

    assert_eq!(app.phase(), Phase::Setup);
    app.begin("What now?", &spread).unwrap();
    assert_eq!(app.phase(), Phase::Drawing);

    // First visit: the tutorial holds the first card back.
    assert!(app.session().awaiting_tutorial());
    assert!(app.controller().active().is_none());
    app.handle_input(InputEvent::Command(UiCommand::DismissTutorial));

    let mut request = None;
    for slot in 0..3 {
        let presented = app.controller().active().unwrap().card;

        // Pull the card a little, then reveal it.
        for _ in 0..5 {
            app.handle_input(signal(Gesture::Pinch, 0.4, 0.6));
            assert!(app.tick().is_none());
        }
        let moved = app.controller().active().unwrap().transform.position;
        assert!(moved.z > 0.0);

        app.handle_input(signal(Gesture::Fist, 0.4, 0.6));
        assert!(app.controller().is_latched());
        assert!(app.tick().is_none());

        clock.advance(CONFIRM_DELAY);
        let out = app.tick();
        assert_eq!(app.session().drawn().len(), slot + 1);
        assert_eq!(app.session().drawn()[slot].card, presented);

        if slot < 2 {
            assert!(out.is_none());
            assert_eq!(app.phase(), Phase::Drawing);
        } else {
            request = out;
        }
    }

    assert_eq!(app.phase(), Phase::Interpreting);
    let drawn = app.session().drawn().to_vec();
    let mut ids: Vec<_> = drawn.iter().map(|d| d.card.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    let request = request.expect("the third confirmation requests a reading");
    assert_eq!(request.reading.cards, drawn);

    let generator = Arc::new(Recording::default());
    let dispatcher = InterpretationDispatcher::new(Oracle::with_generator(generator.clone())).unwrap();
    dispatcher.dispatch(request);
    let (seq, text) = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    let prompts = generator.prompts.lock().unwrap();
    for (i, dc) in drawn.iter().enumerate() {
        assert!(prompts[0].contains(&card_line(i, dc, Locale::En)));
    }
    assert!(prompts[0].contains("What now?"));
    drop(prompts);

    app.deliver_interpretation(seq, text);
    assert_eq!(app.phase(), Phase::Complete);
    assert!(app.session().interpretation().unwrap().contains("A bridge appears."));

    // Restart keeps the question and skips the tutorial.
    app.handle_input(InputEvent::Command(UiCommand::Restart));
    assert_eq!(app.phase(), Phase::Drawing);
    assert_eq!(app.session().question(), "What now?");
    assert!(!app.session().awaiting_tutorial());
    assert!(app.session().drawn().is_empty());
    assert!(app.controller().active().is_some());
}

#[test]
fn no_hand_freezes_the_card() {
    let catalog = Catalog::standard();
    let spread = *catalog.spread("daily").unwrap();
    let clock = ManualClock::new();

    let mut app = AppState::new(
        DrawSession::new(catalog, StdRng::seed_from_u64(3)),
        CardController::new(clock.clone(), StdRng::seed_from_u64(4)),
        Locale::Zh,
        InputMode::Hand,
        false,
    );
    app.begin("问", &spread).unwrap();
    app.handle_input(InputEvent::Command(UiCommand::DismissTutorial));

    app.handle_input(signal(Gesture::Pinch, 0.9, 0.1));
    app.tick();
    app.handle_input(InputEvent::NoHand);
    let before = app.controller().active().unwrap().transform.position;
    for _ in 0..10 {
        clock.advance(Duration::from_millis(16));
        app.tick();
    }
    let after = app.controller().active().unwrap().transform.position;
    assert_eq!(before, after);
    assert_eq!(app.phase(), Phase::Drawing);
}
