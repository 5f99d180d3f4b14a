//! What the user is told, independent of where it is drawn.
//!
//! The window renders the ASCII parts of this with its bitmap font; the
//! terminal [`Narrator`] prints the localized text as the session moves.

use tarot_deck::{ui, Card, DrawnCard, Locale, Spread};

use crate::gesture::Gesture;
use crate::session::Phase;

// ════════════════════════════════════════════════════════════════════════════
// Mode indicator
// ════════════════════════════════════════════════════════════════════════════

/// Where pointer signals are coming from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Hand,
    Pointer,
}

pub fn mode_indicator(mode: InputMode, gesture: Gesture, locale: Locale) -> String {
    let t = ui(locale);
    match mode {
        InputMode::Hand    => format!("{}: {}", t.hand_mode, gesture),
        InputMode::Pointer => t.mouse_mode.to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Slot progress
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotMark {
    Drawn,
    Current,
    Pending,
}

impl SlotMark {
    pub fn symbol(self) -> char {
        match self {
            SlotMark::Drawn   => '●',
            SlotMark::Current => '◉',
            SlotMark::Pending => '○',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotProgress {
    pub label: &'static str,
    pub mark:  SlotMark,
}

pub fn slot_progress(spread: &Spread, drawn: usize, locale: Locale) -> Vec<SlotProgress> {
    spread.slot_labels(locale)
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let mark = match i.cmp(&drawn) {
                std::cmp::Ordering::Less    => SlotMark::Drawn,
                std::cmp::Ordering::Equal   => SlotMark::Current,
                std::cmp::Ordering::Greater => SlotMark::Pending,
            };
            SlotProgress { label, mark }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Reading display
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayLine {
    Header(String),
    Bullet(String),
    Text(String),
    Blank,
}

/// Simplify the oracle's markdown: bold or `#` lines become headers,
/// `- ` / `* ` lines become bullets.
pub fn interpretation_lines(text: &str) -> Vec<DisplayLine> {
    text.lines()
        .map(|raw| {
            let line = raw.trim_end();
            if line.trim().is_empty() {
                DisplayLine::Blank
            } else if line.starts_with("**") {
                DisplayLine::Header(line.replace("**", "").trim().to_string())
            } else if line.starts_with('#') {
                DisplayLine::Header(line.trim_start_matches('#').replace("**", "").trim().to_string())
            } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                DisplayLine::Bullet(rest.replace("**", ""))
            } else {
                DisplayLine::Text(line.replace("**", ""))
            }
        })
        .collect()
}

impl DisplayLine {
    /// Terminal rendering.
    pub fn render(&self) -> String {
        match self {
            DisplayLine::Header(h) => format!("  ── {h} ──"),
            DisplayLine::Bullet(b) => format!("    • {b}"),
            DisplayLine::Text(t)   => format!("  {t}"),
            DisplayLine::Blank     => String::new(),
        }
    }
}

/// `Past · The Fool · Upright`
pub fn card_summary(spread: &Spread, index: usize, drawn: &DrawnCard, locale: Locale) -> String {
    format!(
        "{} · {} · {}",
        spread.slot(index, locale).unwrap_or("?"),
        drawn.card.name(locale),
        drawn.orientation.label(locale),
    )
}

pub fn tutorial_lines(locale: Locale) -> [&'static str; 4] {
    let t = ui(locale);
    [t.gesture_title, t.gesture_open, t.gesture_pinch, t.gesture_fist]
}

// ════════════════════════════════════════════════════════════════════════════
// Narrator — terminal transcript of the session
// ════════════════════════════════════════════════════════════════════════════

/// Snapshot of what the narrator reports on.
#[derive(Clone, Debug)]
pub struct SessionView<'a> {
    pub phase:             Phase,
    pub question:          &'a str,
    pub spread:            Option<&'a Spread>,
    pub drawn:             &'a [DrawnCard],
    pub presented:         Option<Card>,
    pub awaiting_tutorial: bool,
    pub interpretation:    Option<&'a str>,
    pub mode:              InputMode,
    pub locale:            Locale,
}

/// Emits lines only when something changed since the last call.
#[derive(Debug, Default)]
pub struct Narrator {
    phase:     Option<Phase>,
    presented: Option<&'static str>,
    drawn:     usize,
    tutorial:  bool,
    mode:      Option<InputMode>,
    locale:    Option<Locale>,
}

impl Narrator {
    pub fn new() -> Self { Narrator::default() }

    pub fn narrate(&mut self, view: &SessionView<'_>) -> Vec<String> {
        let t = ui(view.locale);
        let mut out = Vec::new();

        let relocalized = self.locale.replace(view.locale) != Some(view.locale);
        if relocalized && self.phase.is_some() {
            out.push(format!("  [{}]", view.locale.language_name()));
        }

        if self.mode.replace(view.mode) != Some(view.mode) {
            out.push(format!("  ({})", mode_indicator(view.mode, Gesture::None, view.locale)));
        }

        if self.phase.replace(view.phase) != Some(view.phase) {
            self.presented = None;
            self.drawn = 0;
            self.tutorial = false;
            match view.phase {
                Phase::Setup => {}
                Phase::Drawing => {
                    if let Some(spread) = view.spread {
                        out.push(format!("  {} — \"{}\"", spread.name(view.locale), view.question));
                    }
                }
                Phase::Interpreting => out.push(format!("  {}", t.consulting)),
                Phase::Complete => {
                    out.push(format!("  {}: \"{}\"", t.spiritual_insight, view.question));
                    if let Some(spread) = view.spread {
                        for (i, dc) in view.drawn.iter().enumerate() {
                            out.push(format!("    {}", card_summary(spread, i, dc, view.locale)));
                        }
                    }
                    out.push(String::new());
                    for line in interpretation_lines(view.interpretation.unwrap_or_default()) {
                        out.push(line.render());
                    }
                    out.push(String::new());
                    out.push(format!("  [R] {}", t.restart));
                }
            }
        }

        if view.awaiting_tutorial && !self.tutorial {
            for line in tutorial_lines(view.locale) {
                out.push(format!("  {line}"));
            }
            out.push(format!("  [Enter/ok] {}", t.got_it));
        }
        self.tutorial = view.awaiting_tutorial;

        if let Some(spread) = view.spread {
            if view.drawn.len() > self.drawn {
                for i in self.drawn..view.drawn.len() {
                    out.push(format!("    {}", card_summary(spread, i, &view.drawn[i], view.locale)));
                }
            }
        }
        self.drawn = view.drawn.len();

        let presented = view.presented.map(|c| c.id);
        if presented != self.presented {
            if let (Some(spread), Some(_)) = (view.spread, presented) {
                let progress: String = slot_progress(spread, view.drawn.len(), view.locale)
                    .iter()
                    .map(|s| format!("{} {}", s.mark.symbol(), s.label))
                    .collect::<Vec<_>>()
                    .join("   ");
                out.push(format!("  {progress}"));
            }
            self.presented = presented;
        }

        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
