//! Interactive browser for the card catalog and spreads.

use tarot_deck::{Catalog, Locale, Orientation};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              Tarot Catalog Explorer                  ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let catalog = Catalog::standard();
    if let Err(e) = catalog.validate() {
        eprintln!("  ⚠  Catalog is invalid: {}", e);
        std::process::exit(1);
    }

    let locale = match read_line("Language (zh/en, default zh): ").trim() {
        "" => Locale::Zh,
        code => Locale::parse(code).unwrap_or_else(|| {
            println!("  ⚠  Unknown language, using zh.");
            Locale::Zh
        }),
    };

    loop {
        println!("  1. List cards");
        println!("  2. List spreads");
        println!("  3. Show a card");
        let choice = read_line("Select (1–3, or q to quit): ");
        // EOF on stdin
        if choice.is_empty() { break; }

        match choice.trim() {
            "q" | "Q" => {
                println!("\nGoodbye!\n");
                break;
            }
            "1" => {
                println!();
                for card in catalog.cards() {
                    println!("  {:>4}  {:<6} {}", card.id, card.numeral, card.name(locale));
                }
                println!();
            }
            "2" => {
                println!();
                for spread in catalog.spreads() {
                    println!(
                        "  {:<8} {} ({} cards): {}",
                        spread.id,
                        spread.name(locale),
                        spread.count,
                        spread.slot_labels(locale).join(" / "),
                    );
                }
                println!();
            }
            "3" => {
                let id = read_line("  Card id: ");
                match catalog.card(id.trim()) {
                    Some(card) => {
                        println!();
                        println!("  ┌─ {} {} ─", card.numeral, card.name(locale));
                        println!("  │  {}: {}", Orientation::Upright.label(locale),
                                 card.meaning(Orientation::Upright, locale));
                        println!("  │  {}: {}", Orientation::Reversed.label(locale),
                                 card.meaning(Orientation::Reversed, locale));
                        println!("  └─ {}", card.image_url);
                        println!();
                    }
                    None => println!("  ⚠  No card with id '{}'.\n", id.trim()),
                }
            }
            _ => println!("  ⚠  Please enter 1–3 or q.\n"),
        }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
