//! Alert rendering.
//!
//! Produces an HTML-flavoured text block (Telegram-style anchors) with the
//! market symbol, USD size, direction, leverage for increases, chain,
//! transaction link and account link.

use crate::config::chains;
use crate::onchain::types::{PositionEvent, PositionKind};
use alloy::primitives::{Address, B256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// One size glyph per this many USD of position size.
pub const USD_PER_GLYPH: u32 = 50_000;
pub const GLYPHS_PER_LINE: usize = 10;
const SIZE_GLYPH: char = '\u{1fad0}';

const ACCOUNT_URL: &str = "https://app.gmx.io/#/actions/";

pub fn render(event: &PositionEvent, market_symbol: &str, chain: &str) -> String {
    let (title, dot) = match event.kind {
        PositionKind::Increase => ("Position Increased", '\u{1F7E2}'),
        PositionKind::Decrease => ("Position Decreased", '\u{1F534}'),
    };
    let arrow = if event.is_long { '\u{1F4C8}' } else { '\u{1F4C9}' };

    let mut direction_line = format!("{} {}", arrow, event.direction());
    if let Some(leverage) = event.leverage {
        let leverage = leverage.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        direction_line.push_str(&format!(" x{:.2}", leverage));
    }

    format!(
        "{dot} {title} {dot}\n\n\
         \u{1FA99} {market_symbol}\n\
         \u{1F4B0} Position Size: ${size}\n\
         {direction_line}\n\
         \u{1F517} {chain}\n\n\
         {glyphs}\n\n\
         <a href='{tx}'>Txn Link</a> | <a href='{account}'>Account</a>\n",
        size = compact_usd(event.size_usd),
        chain = title_case(chain),
        glyphs = size_glyphs(event.size_usd),
        tx = tx_link(chain, &event.tx_hash),
        account = account_link(&event.account),
    )
}

/// `size / 50k` glyphs (half-to-even rounding), at least one, wrapped at
/// ten per line.
pub fn size_glyphs(size_usd: Decimal) -> String {
    let units = size_usd / Decimal::from(USD_PER_GLYPH);
    let count = if units < Decimal::ONE {
        1
    } else {
        units.round().to_usize().unwrap_or(1)
    };

    let glyphs: Vec<char> = std::iter::repeat(SIZE_GLYPH).take(count).collect();
    glyphs
        .chunks(GLYPHS_PER_LINE)
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable dollar amount: `950`, `12K`, `1.5M`, `2.35B`.
pub fn compact_usd(value: Decimal) -> String {
    const UNITS: [(i64, &str); 4] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let abs = value.abs();
    let (scaled, suffix) = UNITS
        .iter()
        .find(|(div, _)| abs >= Decimal::from(*div))
        .map(|(div, suffix)| (abs / Decimal::from(*div), *suffix))
        .unwrap_or((abs, ""));

    let rounded = scaled
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{sign}{rounded}{suffix}")
}

pub fn tx_link(chain: &str, tx_hash: &B256) -> String {
    format!("{}{}", chains::explorer_tx_base(chain), tx_hash)
}

pub fn account_link(account: &Address) -> String {
    format!("{ACCOUNT_URL}{account}")
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
