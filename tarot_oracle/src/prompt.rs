//! Prompt construction.
//!
//! The prompt is a pure function of its inputs: same question, spread,
//! cards and locale always produce byte-identical text.

use tarot_deck::{DrawnCard, Locale};

/// One line per drawn card: `[Position: 1] - The Sun (upright): Positivity, ...`
pub fn card_line(index: usize, drawn: &DrawnCard, locale: Locale) -> String {
    format!(
        "[Position: {}] - {} ({}): {}",
        index + 1,
        drawn.card.name(locale),
        drawn.orientation.as_str(),
        drawn.meaning(locale),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// ReadingPrompt — the builder
// ════════════════════════════════════════════════════════════════════════════

/// Builder for the interpretation prompt.
///
/// ```rust
/// use tarot_oracle::ReadingPrompt;
/// use tarot_deck::Locale;
///
/// let text = ReadingPrompt::new("What now?")
///     .spread_name("Daily Insight")
///     .locale(Locale::En)
///     .build();
///
/// assert!(text.contains("A seeker asks: \"What now?\""));
/// assert!(text.contains("LANGUAGE: Write strictly in English."));
/// ```
#[derive(Clone, Debug)]
pub struct ReadingPrompt<'a> {
    question:    &'a str,
    spread_name: &'a str,
    cards:       &'a [DrawnCard],
    locale:      Locale,
}

impl<'a> ReadingPrompt<'a> {
    pub fn new(question: &'a str) -> Self {
        ReadingPrompt {
            question,
            spread_name: "",
            cards:       &[],
            locale:      Locale::default(),
        }
    }

    pub fn spread_name(mut self, name: &'a str) -> Self {
        self.spread_name = name;
        self
    }

    pub fn cards(mut self, cards: &'a [DrawnCard]) -> Self {
        self.cards = cards;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn build(&self) -> String {
        let card_details = self.cards.iter()
            .enumerate()
            .map(|(i, dc)| card_line(i, dc, self.locale))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
"You are an enigmatic, world-class Tarot Oracle. A seeker asks: \"{question}\".
Spread: \"{spread}\"
Cards pulled:
{cards}

TASK: Provide a captivating and punchy interpretation.
STYLE: Mystical, evocative, but NO fluff. Avoid long-winded introductions.

STRUCTURE:
1. **The Essence** (1-2 sentences of the immediate vibe)
2. **The Threads** (Brief insights for each card, connecting them like a story. 2 sentences max per card)
3. **The Oracle's Verdict** (A single, powerful closing sentence of advice)

LANGUAGE: Write strictly in {language}.
FORMAT: Use clean Markdown with bold headers and bullet points. Make it feel like an ancient prophecy, not a textbook.
",
            question = self.question,
            spread   = self.spread_name,
            cards    = card_details,
            language = self.locale.language_name(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tarot_deck::{Catalog, Orientation};

    fn drawn(id: &str, orientation: Orientation) -> DrawnCard {
        let card = *Catalog::standard().card(id).unwrap();
        DrawnCard::new(card, orientation, Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn card_line_is_one_based_and_localized() {
        let dc = drawn("13", Orientation::Reversed);
        assert_eq!(
            card_line(0, &dc, Locale::En),
            "[Position: 1] - Death (reversed): Resistance to change, personal transformation.",
        );
        assert_eq!(
            card_line(2, &dc, Locale::Zh),
            "[Position: 3] - 死神 (reversed): 抗拒改变，个人转型。",
        );
    }

    #[test]
    fn prompt_embeds_every_card_in_order() {
        let cards = vec![
            drawn("0", Orientation::Upright),
            drawn("2", Orientation::Reversed),
            drawn("21", Orientation::Upright),
        ];
        let text = ReadingPrompt::new("What now?")
            .spread_name("Past, Present, Future")
            .cards(&cards)
            .locale(Locale::En)
            .build();

        let p1 = text.find("[Position: 1] - The Fool (upright)").unwrap();
        let p2 = text.find("[Position: 2] - The High Priestess (reversed)").unwrap();
        let p3 = text.find("[Position: 3] - The World (upright)").unwrap();
        assert!(p1 < p2 && p2 < p3);
        assert!(text.contains("Spread: \"Past, Present, Future\""));
    }

    #[test]
    fn prompt_is_deterministic() {
        let cards = vec![drawn("4", Orientation::Upright)];
        let a = ReadingPrompt::new("q").spread_name("s").cards(&cards).build();
        let b = ReadingPrompt::new("q").spread_name("s").cards(&cards).build();
        assert_eq!(a, b);
    }

    #[test]
    fn chinese_locale_requests_chinese() {
        let text = ReadingPrompt::new("问").locale(Locale::Zh).build();
        assert!(text.contains("Write strictly in Chinese (Simplified)."));
    }
}
