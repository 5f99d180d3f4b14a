//! # tarot_deck
//!
//! The immutable content every reading is built from:
//!
//! * [`Card`] — one catalog entry with localized name and meanings
//! * [`Spread`] — a named layout with a fixed number of slots
//! * [`Orientation`] — upright or reversed, assigned at draw time
//! * [`DrawnCard`] — a card, its orientation and when it was drawn
//! * [`Catalog`] — the deck plus the spreads, validated once at startup
//!
//! Two locales are supported ([`Locale::Zh`] and [`Locale::En`]); every
//! user-facing string carries both.
//!
//! ## Quick start
//!
//! ```rust
//! use tarot_deck::{Catalog, Locale, Orientation};
//!
//! let catalog = Catalog::standard();
//! catalog.validate().unwrap();
//!
//! let ppf = catalog.spread("ppf").unwrap();
//! assert_eq!(ppf.count, 3);
//! assert_eq!(ppf.slot(1, Locale::En), Some("Present"));
//!
//! let fool = catalog.card("0").unwrap();
//! assert_eq!(fool.name(Locale::En), "The Fool");
//! assert_eq!(
//!     fool.meaning(Orientation::Reversed, Locale::En),
//!     "Recklessness, risk-taking, inconsideration.",
//! );
//! ```

mod cards;
mod strings;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cards::{SPREADS, TAROT_DECK, CARD_ASPECT_RATIO};
pub use strings::{ui, UiStrings};

// ════════════════════════════════════════════════════════════════════════════
// Locale
// ════════════════════════════════════════════════════════════════════════════

/// Display language.  Chinese is the default, matching the card tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn all() -> [Locale; 2] { [Locale::Zh, Locale::En] }

    /// Short code used on the command line and in config files.
    pub fn code(self) -> &'static str {
        match self {
            Locale::Zh => "zh",
            Locale::En => "en",
        }
    }

    /// Language name as it should be requested from the text generator.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::Zh => "Chinese (Simplified)",
            Locale::En => "English",
        }
    }

    pub fn parse(code: &str) -> Option<Locale> {
        match code.trim().to_ascii_lowercase().as_str() {
            "zh" | "cn" | "zh-cn" => Some(Locale::Zh),
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            _ => None,
        }
    }

    /// The other locale (the UI has a two-way toggle).
    pub fn toggled(self) -> Locale {
        match self {
            Locale::Zh => Locale::En,
            Locale::En => Locale::Zh,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pair of translations for one piece of static text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Localized {
    pub zh: &'static str,
    pub en: &'static str,
}

impl Localized {
    pub const fn new(zh: &'static str, en: &'static str) -> Self {
        Localized { zh, en }
    }

    pub fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Zh => self.zh,
            Locale::En => self.en,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Orientation
// ════════════════════════════════════════════════════════════════════════════

/// Whether a drawn card landed upright or reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Upright,
    Reversed,
}

impl Orientation {
    /// Stable lowercase tag, also embedded in interpretation prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Upright => "upright",
            Orientation::Reversed => "reversed",
        }
    }

    pub fn is_reversed(self) -> bool { self == Orientation::Reversed }

    /// Localized label shown next to a drawn card.
    pub fn label(self, locale: Locale) -> &'static str {
        let t = ui(locale);
        match self {
            Orientation::Upright => t.upright,
            Orientation::Reversed => t.reversed,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Card
// ════════════════════════════════════════════════════════════════════════════

/// One entry of the deck catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    /// Unique identity within the catalog; pool removal keys on this.
    pub id:        &'static str,
    /// Roman numeral printed on the card face.
    pub numeral:   &'static str,
    pub name:      Localized,
    pub upright:   Localized,
    pub reversed:  Localized,
    pub image_url: &'static str,
}

impl Card {
    pub fn name(&self, locale: Locale) -> &'static str { self.name.get(locale) }

    /// Meaning text for the given orientation.
    pub fn meaning(&self, orientation: Orientation, locale: Locale) -> &'static str {
        match orientation {
            Orientation::Upright => self.upright.get(locale),
            Orientation::Reversed => self.reversed.get(locale),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Spread
// ════════════════════════════════════════════════════════════════════════════

/// A layout: how many cards are drawn and what each position means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spread {
    pub id:    &'static str,
    pub name:  Localized,
    /// Number of cards the reading needs.  Equal to `slots.len()`.
    pub count: usize,
    pub slots: &'static [Localized],
}

impl Spread {
    pub fn name(&self, locale: Locale) -> &'static str { self.name.get(locale) }

    /// Label of the 0-based slot `index`.
    pub fn slot(&self, index: usize, locale: Locale) -> Option<&'static str> {
        self.slots.get(index).map(|s| s.get(locale))
    }

    pub fn slot_labels(&self, locale: Locale) -> Vec<&'static str> {
        self.slots.iter().map(|s| s.get(locale)).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrawnCard
// ════════════════════════════════════════════════════════════════════════════

/// A completed draw.  Never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnCard {
    pub card:        Card,
    pub orientation: Orientation,
    pub drawn_at:    DateTime<Utc>,
}

impl DrawnCard {
    pub fn new(card: Card, orientation: Orientation, drawn_at: DateTime<Utc>) -> Self {
        DrawnCard { card, orientation, drawn_at }
    }

    /// Meaning for the orientation this card was drawn in.
    pub fn meaning(&self, locale: Locale) -> &'static str {
        self.card.meaning(self.orientation, locale)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════

/// Static configuration problems.  Any of these is fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("the deck is empty")]
    EmptyDeck,

    #[error("duplicate card id '{0}'")]
    DuplicateCard(&'static str),

    #[error("duplicate spread id '{0}'")]
    DuplicateSpread(&'static str),

    #[error("spread '{id}' draws {count} cards but the deck only holds {deck}")]
    SpreadExceedsDeck { id: &'static str, count: usize, deck: usize },

    #[error("spread '{id}' needs {count} cards but defines {slots} slots")]
    SlotCountMismatch { id: &'static str, count: usize, slots: usize },

    #[error("spread '{0}' draws no cards")]
    EmptySpread(&'static str),
}

/// The deck and the spreads available for a session.
#[derive(Clone, Copy, Debug)]
pub struct Catalog {
    cards:   &'static [Card],
    spreads: &'static [Spread],
}

impl Default for Catalog {
    fn default() -> Self { Catalog::standard() }
}

impl Catalog {
    /// The built-in major-arcana deck and the three stock spreads.
    pub fn standard() -> Self {
        Catalog { cards: TAROT_DECK, spreads: SPREADS }
    }

    pub fn new(cards: &'static [Card], spreads: &'static [Spread]) -> Self {
        Catalog { cards, spreads }
    }

    pub fn cards(&self)   -> &'static [Card]   { self.cards }
    pub fn spreads(&self) -> &'static [Spread] { self.spreads }
    pub fn deck_size(&self) -> usize { self.cards.len() }

    pub fn card(&self, id: &str) -> Option<&'static Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn spread(&self, id: &str) -> Option<&'static Spread> {
        self.spreads.iter().find(|s| s.id == id)
    }

    /// Check that `spread` can be completed from this deck.
    pub fn check_spread(&self, spread: &Spread) -> Result<(), CatalogError> {
        if spread.count == 0 {
            return Err(CatalogError::EmptySpread(spread.id));
        }
        if spread.slots.len() != spread.count {
            return Err(CatalogError::SlotCountMismatch {
                id:    spread.id,
                count: spread.count,
                slots: spread.slots.len(),
            });
        }
        if spread.count > self.cards.len() {
            return Err(CatalogError::SpreadExceedsDeck {
                id:    spread.id,
                count: spread.count,
                deck:  self.cards.len(),
            });
        }
        Ok(())
    }

    /// Validate every invariant the session relies on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.cards.is_empty() {
            return Err(CatalogError::EmptyDeck);
        }

        let mut ids = HashSet::new();
        for card in self.cards {
            if !ids.insert(card.id) {
                return Err(CatalogError::DuplicateCard(card.id));
            }
        }

        let mut spread_ids = HashSet::new();
        for spread in self.spreads {
            if !spread_ids.insert(spread.id) {
                return Err(CatalogError::DuplicateSpread(spread.id));
            }
            self.check_spread(spread)?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CARDS: &[Card] = &[TAROT_DECK[0], TAROT_DECK[1]];

    #[test]
    fn standard_catalog_is_valid() {
        assert_eq!(Catalog::standard().validate(), Ok(()));
    }

    #[test]
    fn every_spread_has_one_label_per_card() {
        for spread in SPREADS {
            for locale in Locale::all() {
                assert_eq!(spread.slot_labels(locale).len(), spread.count, "{}", spread.id);
            }
        }
    }

    #[test]
    fn past_present_future_labels() {
        let ppf = Catalog::standard().spread("ppf").unwrap();
        assert_eq!(ppf.slot_labels(Locale::En), vec!["Past", "Present", "Future"]);
        assert_eq!(ppf.slot_labels(Locale::Zh), vec!["过去", "现在", "未来"]);
    }

    #[test]
    fn spread_larger_than_deck_is_rejected() {
        let catalog = Catalog::new(TWO_CARDS, SPREADS);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::SpreadExceedsDeck { id: "ppf", count: 3, deck: 2 })
        ));
    }

    #[test]
    fn duplicate_card_ids_are_rejected() {
        const DUP: &[Card] = &[TAROT_DECK[0], TAROT_DECK[0]];
        let catalog = Catalog::new(DUP, &[]);
        assert_eq!(catalog.validate(), Err(CatalogError::DuplicateCard("0")));
    }

    #[test]
    fn slot_mismatch_is_rejected() {
        const BAD: &[Spread] = &[Spread {
            id:    "bad",
            name:  Localized::new("坏", "Bad"),
            count: 2,
            slots: &[Localized::new("一", "One")],
        }];
        let catalog = Catalog::new(TAROT_DECK, BAD);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::SlotCountMismatch { slots: 1, .. })
        ));
    }

    #[test]
    fn meaning_follows_orientation_and_locale() {
        let sun = Catalog::standard().card("19").unwrap();
        assert_eq!(sun.meaning(Orientation::Upright, Locale::En),
                   "Positivity, fun, warmth, success, vitality.");
        assert_eq!(sun.meaning(Orientation::Reversed, Locale::Zh),
                   "内在小孩，感到沮丧，过度乐观。");
    }

    #[test]
    fn locale_parse_and_toggle() {
        assert_eq!(Locale::parse("EN"), Some(Locale::En));
        assert_eq!(Locale::parse("zh-CN"), Some(Locale::Zh));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::Zh.toggled(), Locale::En);
    }

    #[test]
    fn orientation_tags() {
        assert_eq!(Orientation::Upright.as_str(), "upright");
        assert_eq!(Orientation::Reversed.to_string(), "reversed");
        assert_eq!(Orientation::Reversed.label(Locale::Zh), "逆位");
    }
}
