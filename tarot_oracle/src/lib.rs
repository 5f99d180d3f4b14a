//! # tarot_oracle
//!
//! Turns a completed draw into a single interpretation request against a
//! hosted text-generation model and always hands back something displayable.
//!
//! * [`ReadingPrompt`] builds the deterministic prompt text
//! * [`TextGenerator`] is the seam to the remote model; [`GeminiClient`] is
//!   the production implementation
//! * [`Oracle`] is the requester: credential guard, call, failure mapping
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tarot_oracle::{Oracle, OracleConfig};
//! use tarot_deck::{Catalog, DrawnCard, Locale, Orientation};
//!
//! # async fn demo() {
//! let oracle = Oracle::from_config(&OracleConfig::from_env()).unwrap();
//! let catalog = Catalog::standard();
//! let daily = catalog.spread("daily").unwrap();
//! let drawn = vec![DrawnCard::new(
//!     *catalog.card("19").unwrap(),
//!     Orientation::Upright,
//!     chrono::Utc::now(),
//! )];
//!
//! let text = oracle
//!     .request_interpretation("What now?", daily.name(Locale::En), &drawn, Locale::En)
//!     .await;
//! println!("{text}");
//! # }
//! ```

mod gemini;
mod generator;
mod oracle;
mod prompt;

pub use gemini::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use generator::{GenerationError, TextGenerator};
pub use oracle::{FailureText, Oracle, OracleConfig, Reading};
pub use prompt::{card_line, ReadingPrompt};
