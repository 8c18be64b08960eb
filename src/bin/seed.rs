//! # Seed Data Generator
//!
//! Fills the configured database with fake invoices for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 invoices (default)
//! cargo run --bin seed
//!
//! # Generate a custom amount (at most 1000 per year)
//! cargo run --bin seed -- --count 500
//! ```
//!
//! Each invoice gets:
//! - Number `F/{n}/{current year}` with `n` unique between 1 and 1000
//! - Random 10-digit seller and buyer NIPs
//! - A three-word product name
//! - A net amount between 100.00 and 99999.00
//! - An issuance date since 1970

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use clap::Parser;
use rand::{Rng, seq::SliceRandom};
use rust_decimal::Decimal;
use std::sync::Arc;

use invoice_desk::{
  domain::invoice::{InvoiceData, InvoiceError, InvoiceService},
  infrastructure::{config::Config, persistence},
};

const DEFAULT_COUNT: u32 = 50;
const MAX_NUMBER: u32 = 1000;

const WORDS: &[&str] = &[
  "alpha", "amber", "anchor", "basic", "blue", "bolt", "cable", "carbon", "clamp", "copper",
  "delta", "digital", "drill", "eco", "filter", "frame", "gear", "glass", "hinge", "iron",
  "kit", "lamp", "laser", "lever", "linen", "matte", "metal", "module", "nylon", "oak",
  "panel", "pipe", "plus", "pro", "pump", "rail", "sensor", "shelf", "solid", "steel",
  "switch", "tape", "timber", "tool", "valve", "wire", "wood", "zinc",
];

fn product_name(rng: &mut impl Rng) -> String {
  (0..3)
    .filter_map(|_| WORDS.choose(&mut *rng))
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
}

fn nip(rng: &mut impl Rng) -> String {
  (0..10)
    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
    .collect()
}

fn issuance_date(rng: &mut impl Rng, today: NaiveDate) -> Option<NaiveDate> {
  let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
  let days = (today - epoch).num_days();
  Some(epoch + Duration::days(rng.gen_range(0..=days)))
}

/// Fill the configured database with fake invoices for development
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Cli {
  /// Number of invoices to generate
  #[arg(
    short,
    long,
    default_value_t = DEFAULT_COUNT,
    value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_NUMBER))
  )]
  count: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  let count = Cli::parse().count;

  let config = Config::load().context("Failed to load configuration")?;
  let repository = persistence::connect(&config.database)
    .await
    .context("Failed to set up the database")?;
  let service = Arc::new(InvoiceService::new(repository));

  let today = Utc::now().date_naive();
  let mut rng = rand::thread_rng();
  let mut numbers: Vec<u32> = (1..=MAX_NUMBER).collect();
  numbers.shuffle(&mut rng);

  println!("Generating {count} invoices...");

  let mut created = 0;
  let mut skipped = 0;
  for n in numbers.into_iter().take(count as usize) {
    let data = InvoiceData::parse(
      format!("F/{}/{}", n, today.year()),
      nip(&mut rng),
      nip(&mut rng),
      product_name(&mut rng),
      Decimal::new(rng.gen_range(10_000..=9_999_900), 2),
      issuance_date(&mut rng, today),
    )?;

    match service.create_invoice(data).await {
      Ok(_) => created += 1,
      Err(InvoiceError::InvoiceNumberAlreadyExists(_)) => skipped += 1,
      Err(e) => return Err(e.into()),
    }
  }

  println!("Created {created} invoices, skipped {skipped} existing numbers");
  Ok(())
}
