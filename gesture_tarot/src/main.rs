//! gesture_tarot — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gesture_tarot::app::{run, RunOptions};
use gesture_tarot::config::AppConfig;
use tarot_deck::{ui, Catalog, Locale, Spread};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gesture_tarot", version, about = "Draw tarot cards with your hands")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface language: zh or en
    #[arg(short = 'L', long)]
    locale: Option<String>,

    /// The question to ask; prompted for when omitted
    #[arg(short, long)]
    question: Option<String>,

    /// Spread id (daily, ppf, choice); prompted for when omitted
    #[arg(short, long)]
    spread: Option<String>,

    /// Ignore the hand tracker and use the mouse
    #[arg(long)]
    mouse: bool,

    /// Read pointer events from stdin instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Log filter, e.g. `info` or `gesture_tarot=debug`
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the cards and spreads, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let config = AppConfig::resolve(args.config.as_deref())
        .context("failed to load configuration")?;

    let catalog = Catalog::standard();
    catalog.validate().context("card catalog is invalid")?;

    let locale = match args.locale.as_deref() {
        Some(code) => match Locale::parse(code) {
            Some(l) => l,
            None => bail!("unknown locale '{code}' (expected zh or en)"),
        },
        None => config.display.locale,
    };
    let t = ui(locale);

    if args.list {
        print_catalog(&catalog, locale);
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            Gesture Tarot — Mystic Oracle             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  {}", t.title);
    println!("  {}", t.subtitle);
    println!();

    if !config.oracle.has_credential() {
        println!("  ⚠  {}", t.missing_key_title);
        println!("     {}", t.missing_key_hint);
        println!();
    }

    let question = match args.question {
        Some(q) => q,
        None => ask_question(locale)?,
    };
    if question.trim().is_empty() {
        bail!("{}", t.question_required);
    }

    let spread = match args.spread.as_deref() {
        Some(id) => match catalog.spread(id) {
            Some(s) => *s,
            None => bail!("unknown spread '{id}'"),
        },
        None => pick_spread(&catalog, locale),
    };

    println!();
    println!("  {} …", t.commence);
    println!();

    run(RunOptions {
        config,
        catalog,
        question,
        spread,
        locale,
        pointer_only: args.mouse,
        headless: args.headless || cfg!(not(feature = "window")),
    })
}

fn ask_question(locale: Locale) -> Result<String> {
    let t = ui(locale);
    println!("  {}", t.intent);
    loop {
        let line = read_line(&format!("  {} ({}): ", t.question_label, t.question_placeholder))?;
        // EOF on stdin
        if line.is_empty() {
            return Ok(String::new());
        }
        if !line.trim().is_empty() {
            return Ok(line.trim().to_string());
        }
        println!("  ⚠  {}", t.question_required);
    }
}

fn pick_spread(catalog: &Catalog, locale: Locale) -> Spread {
    let t = ui(locale);
    println!("  {}:", t.choose_spread);
    for (i, spread) in catalog.spreads().iter().enumerate() {
        println!(
            "    {}. {}  ({})",
            i + 1,
            spread.name(locale),
            spread.slot_labels(locale).join(" / "),
        );
    }
    let choice = read_line(&format!("  (1–{}, default 1): ", catalog.spreads().len()))
        .unwrap_or_default();
    let index = choice.trim().parse::<usize>().ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&n| n < catalog.spreads().len())
        .unwrap_or(0);
    catalog.spreads()[index]
}

fn print_catalog(catalog: &Catalog, locale: Locale) {
    println!();
    for spread in catalog.spreads() {
        println!("  {:<8} {}: {}", spread.id, spread.name(locale), spread.slot_labels(locale).join(" / "));
    }
    println!();
    for card in catalog.cards() {
        println!("  {:>4}  {:<6} {}", card.id, card.numeral, card.name(locale));
    }
    println!();
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}
