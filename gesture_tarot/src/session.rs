//! The draw session orchestrator.
//!
//! ```text
//!   Setup ──start_drawing──▶ Drawing ──last card──▶ Interpreting ──result──▶ Complete
//!     ▲                        │  ▲                                             │
//!     │                        └──┘ card confirmed, more to draw                │
//!     └───────────────────────────────── reset ─────────────────────────────────┘
//! ```
//!
//! Every transition returns a [`SessionCommand`] telling the host what to do
//! next (present a card, show the tutorial, ask the oracle).  The session
//! never talks to the controller or the oracle itself.

use chrono::Utc;
use rand::Rng;
use tarot_deck::{Card, Catalog, CatalogError, DrawnCard, Orientation, Spread};
use tarot_oracle::Reading;
use thiserror::Error;
use tracing::{debug, info};

use crate::tutorial::SessionStorage;

// ════════════════════════════════════════════════════════════════════════════
// Phase
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Setup,
    Drawing,
    Interpreting,
    Complete,
}

impl Phase {
    /// Forward one step at a time, or back to `Setup` from anywhere.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Setup, Drawing) | (Drawing, Interpreting) | (Interpreting, Complete) | (_, Setup)
        )
    }
}

/// What the host should do after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    PresentCard(Card),
    ShowTutorial,
    RequestInterpretation(Reading),
    Nothing,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("a question is required")]
    EmptyQuestion,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("card '{0}' is not in the remaining pool")]
    NotInPool(&'static str),

    #[error("no cards left to present")]
    EmptyPool,

    #[error("operation needs the {expected:?} phase, session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
}

// ════════════════════════════════════════════════════════════════════════════
// DrawSession
// ════════════════════════════════════════════════════════════════════════════

pub struct DrawSession<R: Rng> {
    catalog:   Catalog,
    rng:       R,
    storage:   SessionStorage,

    phase:     Phase,
    question:  String,
    spread:    Option<Spread>,
    remaining: Vec<Card>,
    drawn:     Vec<DrawnCard>,

    /// Card currently handed to the controller.
    presented:         Option<Card>,
    awaiting_tutorial: bool,
    interpretation:    Option<String>,
}

impl<R: Rng> DrawSession<R> {
    pub fn new(catalog: Catalog, rng: R) -> Self {
        DrawSession::with_storage(catalog, rng, SessionStorage::new())
    }

    pub fn with_storage(catalog: Catalog, rng: R, storage: SessionStorage) -> Self {
        DrawSession {
            catalog,
            rng,
            storage,
            phase:     Phase::Setup,
            question:  String::new(),
            spread:    None,
            remaining: Vec::new(),
            drawn:     Vec::new(),
            presented: None,
            awaiting_tutorial: false,
            interpretation:    None,
        }
    }

    fn transition(&mut self, to: Phase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(to) {
            return Err(SessionError::InvalidTransition { from: self.phase, to });
        }
        debug!(from = ?self.phase, ?to, "phase transition");
        self.phase = to;
        Ok(())
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase != expected {
            return Err(SessionError::WrongPhase { expected, actual: self.phase });
        }
        Ok(())
    }

    /// Begin a reading.  Shows the tutorial first on the first draw of the
    /// process; otherwise presents a random card.
    pub fn start_drawing(&mut self, question: &str, spread: &Spread) -> Result<SessionCommand, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        self.catalog.check_spread(spread)?;
        self.transition(Phase::Drawing)?;

        self.question = question.to_string();
        self.spread = Some(*spread);
        self.remaining = self.catalog.cards().to_vec();
        self.drawn.clear();
        self.interpretation = None;
        info!(spread = spread.id, %question, "drawing started");

        if !self.storage.tutorial_seen() {
            self.awaiting_tutorial = true;
            return Ok(SessionCommand::ShowTutorial);
        }
        self.present_next()
    }

    /// Close the tutorial and present the withheld first card.
    pub fn dismiss_tutorial(&mut self) -> Result<SessionCommand, SessionError> {
        if !self.awaiting_tutorial {
            return Ok(SessionCommand::Nothing);
        }
        self.awaiting_tutorial = false;
        self.storage.mark_tutorial_seen();

        if self.phase == Phase::Drawing && self.presented.is_none() {
            self.present_next()
        } else {
            Ok(SessionCommand::Nothing)
        }
    }

    fn present_next(&mut self) -> Result<SessionCommand, SessionError> {
        if self.remaining.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        let card = self.remaining[self.rng.gen_range(0..self.remaining.len())];
        self.presented = Some(card);
        Ok(SessionCommand::PresentCard(card))
    }

    /// Record a confirmed card.  Either presents the next card or, with the
    /// spread full, moves to `Interpreting` and asks for the reading.
    pub fn on_card_confirmed(&mut self, card: Card, orientation: Orientation) -> Result<SessionCommand, SessionError> {
        self.expect_phase(Phase::Drawing)?;
        let spread = self.spread.ok_or(SessionError::WrongPhase {
            expected: Phase::Drawing,
            actual:   Phase::Setup,
        })?;

        let pos = self.remaining.iter()
            .position(|c| c.id == card.id)
            .ok_or(SessionError::NotInPool(card.id))?;
        self.remaining.swap_remove(pos);
        self.presented = None;
        self.drawn.push(DrawnCard::new(card, orientation, Utc::now()));
        info!(card = card.id, %orientation, drawn = self.drawn.len(), of = spread.count, "card drawn");

        if self.drawn.len() == spread.count {
            self.transition(Phase::Interpreting)?;
            return Ok(SessionCommand::RequestInterpretation(Reading {
                question: self.question.clone(),
                spread,
                cards:    self.drawn.clone(),
            }));
        }
        self.present_next()
    }

    /// Store the interpretation text.  Any text completes the reading.
    pub fn on_interpretation(&mut self, text: String) -> Result<(), SessionError> {
        self.expect_phase(Phase::Interpreting)?;
        self.transition(Phase::Complete)?;
        self.interpretation = Some(text);
        Ok(())
    }

    /// Back to `Setup`.  The tutorial flag survives.
    pub fn reset(&mut self) {
        self.phase = Phase::Setup;
        self.question.clear();
        self.spread = None;
        self.remaining.clear();
        self.drawn.clear();
        self.presented = None;
        self.awaiting_tutorial = false;
        self.interpretation = None;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self)             -> Phase             { self.phase }
    pub fn question(&self)          -> &str              { &self.question }
    pub fn spread(&self)            -> Option<&Spread>   { self.spread.as_ref() }
    pub fn drawn(&self)             -> &[DrawnCard]      { &self.drawn }
    pub fn remaining(&self)         -> &[Card]           { &self.remaining }
    pub fn presented(&self)         -> Option<Card>      { self.presented }
    pub fn awaiting_tutorial(&self) -> bool              { self.awaiting_tutorial }
    pub fn interpretation(&self)    -> Option<&str>      { self.interpretation.as_deref() }
    pub fn catalog(&self)           -> &Catalog          { &self.catalog }
    pub fn storage(&self)           -> &SessionStorage   { &self.storage }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
