//! Position event payload decoding.
//!
//! The emitter's item arrays are read by fixed position. Each position we
//! read is paired with the key GMX writes there, and a key mismatch fails
//! the event instead of silently reading the wrong field.
//!
//! Fixed-point scales:
//!   sizeDeltaUsd                 1e30
//!   collateralAmount             10^decimals
//!   collateralTokenPrice.max     10^(30 - decimals)

use super::abi::{AddressKeyValue, BoolKeyValue, EventLogData, UintKeyValue};
use super::types::{PositionEvent, PositionKind};
use crate::error::DecodeError;
use crate::infra::TokenDirectory;
use alloy::primitives::{Address, B256, U256};
use rust_decimal::Decimal;

/// USD values on GMX carry 30 decimals.
pub const USD_DECIMALS: u32 = 30;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;
const MAX_SCALE: u32 = 28;

/// Where a field lives in one of the item arrays, and the key expected there.
#[derive(Debug, Clone, Copy)]
pub struct ItemSlot {
    pub index: usize,
    pub key: &'static str,
}

pub const ACCOUNT: ItemSlot = ItemSlot { index: 0, key: "account" };
pub const MARKET: ItemSlot = ItemSlot { index: 1, key: "market" };
pub const COLLATERAL_TOKEN: ItemSlot = ItemSlot { index: 2, key: "collateralToken" };
pub const COLLATERAL_AMOUNT: ItemSlot = ItemSlot { index: 2, key: "collateralAmount" };
pub const COLLATERAL_TOKEN_PRICE: ItemSlot = ItemSlot { index: 10, key: "collateralTokenPrice.max" };
pub const SIZE_DELTA_USD: ItemSlot = ItemSlot { index: 12, key: "sizeDeltaUsd" };
pub const IS_LONG: ItemSlot = ItemSlot { index: 0, key: "isLong" };

trait KeyValue {
    type Value;
    fn key(&self) -> &str;
    fn value(&self) -> Self::Value;
}

impl KeyValue for AddressKeyValue {
    type Value = Address;
    fn key(&self) -> &str {
        &self.key
    }
    fn value(&self) -> Address {
        self.value
    }
}

impl KeyValue for UintKeyValue {
    type Value = U256;
    fn key(&self) -> &str {
        &self.key
    }
    fn value(&self) -> U256 {
        self.value
    }
}

impl KeyValue for BoolKeyValue {
    type Value = bool;
    fn key(&self) -> &str {
        &self.key
    }
    fn value(&self) -> bool {
        self.value
    }
}

fn pick<T: KeyValue>(items: &[T], list: &'static str, slot: ItemSlot) -> Result<T::Value, DecodeError> {
    let item = items.get(slot.index).ok_or(DecodeError::MissingItem {
        list,
        index: slot.index,
    })?;
    if item.key() != slot.key {
        return Err(DecodeError::UnexpectedKey {
            list,
            index: slot.index,
            expected: slot.key,
            found: item.key().to_string(),
        });
    }
    Ok(item.value())
}

/// Convert a fixed-point integer with `scale` decimals into a `Decimal`.
///
/// Fractional digits beyond what a `Decimal` can hold are truncated; an
/// integer part too large for a `Decimal` is an error.
pub fn from_fixed(raw: U256, scale: u32, field: &'static str) -> Result<Decimal, DecodeError> {
    let mut mantissa = raw;
    let mut scale = scale;
    while scale > MAX_SCALE || mantissa > U256::from(MAX_MANTISSA) {
        if scale == 0 {
            return Err(DecodeError::Overflow(field));
        }
        mantissa /= U256::from(10u8);
        scale -= 1;
    }
    let mantissa = u128::try_from(mantissa).map_err(|_| DecodeError::Overflow(field))?;
    Decimal::try_from_i128_with_scale(mantissa as i128, scale).map_err(|_| DecodeError::Overflow(field))
}

/// Decode one position event payload.
///
/// The collateral token must be in the directory (its decimals set both
/// the amount and the price scale). Leverage is computed for increases
/// only; a zero collateral value there fails the event.
pub fn decode_position(
    kind: PositionKind,
    data: &EventLogData,
    tx_hash: B256,
    tokens: &TokenDirectory,
) -> Result<PositionEvent, DecodeError> {
    let addresses = &data.addressItems.items;
    let uints = &data.uintItems.items;
    let bools = &data.boolItems.items;

    let account = pick(addresses, "addressItems", ACCOUNT)?;
    let market = pick(addresses, "addressItems", MARKET)?;
    let collateral_token = pick(addresses, "addressItems", COLLATERAL_TOKEN)?;
    let raw_collateral = pick(uints, "uintItems", COLLATERAL_AMOUNT)?;
    let raw_price = pick(uints, "uintItems", COLLATERAL_TOKEN_PRICE)?;
    let raw_size = pick(uints, "uintItems", SIZE_DELTA_USD)?;
    let is_long = pick(bools, "boolItems", IS_LONG)?;

    let decimals = tokens.decimals(&collateral_token)?;
    let price_scale = USD_DECIMALS
        .checked_sub(u32::from(decimals))
        .ok_or(DecodeError::DecimalsOutOfRange(decimals))?;

    let size_usd = from_fixed(raw_size, USD_DECIMALS, "position size")?;
    let collateral_amount = from_fixed(raw_collateral, u32::from(decimals), "collateral amount")?;
    let collateral_price = from_fixed(raw_price, price_scale, "collateral price")?;
    let collateral_usd = collateral_amount
        .checked_mul(collateral_price)
        .ok_or(DecodeError::Overflow("collateral value"))?;

    let leverage = match kind {
        PositionKind::Increase => {
            if collateral_usd.is_zero() {
                return Err(DecodeError::ZeroCollateral);
            }
            Some(
                size_usd
                    .checked_div(collateral_usd)
                    .ok_or(DecodeError::Overflow("leverage"))?,
            )
        }
        PositionKind::Decrease => None,
    };

    Ok(PositionEvent {
        kind,
        account,
        market,
        collateral_token,
        collateral_decimals: decimals,
        size_usd,
        collateral_amount,
        collateral_price,
        collateral_usd,
        leverage,
        is_long,
        tx_hash,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::infra::TokenInfo;
    use alloy::primitives::address;
    use rust_decimal_macros::dec;

    const ACCT: Address = address!("0x1111111111111111111111111111111111111111");
    const MKT: Address = address!("0x70d95587d40A2caf56bd97485aB3Eec10Bee6336");
    const WETH: Address = address!("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1");
    const USDC: Address = address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831");

    fn tokens() -> TokenDirectory {
        TokenDirectory::from_tokens([TokenInfo::new(WETH, "WETH", 18), TokenInfo::new(USDC, "USDC", 6)])
    }

    fn eth_long() -> EventLogData {
        eth_long_payload(ACCT, MKT, WETH)
    }

    #[test]
    fn test_increase_derived_values() {
        let ev = decode_position(PositionKind::Increase, &eth_long(), B256::ZERO, &tokens()).unwrap();

        assert_eq!(ev.account, ACCT);
        assert_eq!(ev.market, MKT);
        assert_eq!(ev.collateral_decimals, 18);
        assert_eq!(ev.size_usd, dec!(12000));
        assert_eq!(ev.collateral_amount, dec!(2));
        assert_eq!(ev.collateral_price, dec!(3000));
        assert_eq!(ev.collateral_usd, dec!(6000));
        assert_eq!(ev.leverage, Some(dec!(2)));
        assert_eq!(ev.direction(), "Long");
    }

    #[test]
    fn test_decrease_has_no_leverage() {
        // Full close: collateral goes to zero, which is fine for a decrease.
        let data = position_payload(
            ACCT,
            MKT,
            USDC,
            U256::ZERO,
            pow10(30 - 6),
            U256::from(500u32) * pow10(30),
            false,
        );
        let ev = decode_position(PositionKind::Decrease, &data, B256::ZERO, &tokens()).unwrap();

        assert_eq!(ev.leverage, None);
        assert_eq!(ev.collateral_price, dec!(1));
        assert_eq!(ev.direction(), "Short");
    }

    #[test]
    fn test_zero_collateral_increase_fails() {
        let data = position_payload(ACCT, MKT, USDC, U256::ZERO, pow10(24), pow10(33), true);
        let err = decode_position(PositionKind::Increase, &data, B256::ZERO, &tokens()).unwrap_err();
        assert!(matches!(err, DecodeError::ZeroCollateral));
    }

    #[test]
    fn test_unknown_collateral_token() {
        let mut data = eth_long();
        data.addressItems.items[2].value = Address::with_last_byte(7);
        let err = decode_position(PositionKind::Increase, &data, B256::ZERO, &tokens()).unwrap_err();
        assert!(matches!(err, DecodeError::Lookup(miss) if miss.kind == "token"));
    }

    #[test]
    fn test_missing_index() {
        let mut data = eth_long();
        data.uintItems.items.truncate(12);
        let err = decode_position(PositionKind::Increase, &data, B256::ZERO, &tokens()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingItem { list: "uintItems", index: 12 }));
    }

    #[test]
    fn test_key_mismatch_fails_closed() {
        let mut data = eth_long();
        data.addressItems.items.swap(1, 2);
        let err = decode_position(PositionKind::Increase, &data, B256::ZERO, &tokens()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedKey { index: 1, expected: "market", .. }
        ));
    }

    #[test]
    fn test_from_fixed_truncates_excess_scale() {
        // 1 wei of USD at 1e30 scale is below Decimal's resolution.
        assert_eq!(from_fixed(U256::from(1u8), 30, "x").unwrap(), Decimal::ZERO);
        assert_eq!(
            from_fixed(U256::from(123_456_789u64) * pow10(24), 30, "x").unwrap(),
            dec!(123.456789)
        );
    }

    #[test]
    fn test_from_fixed_overflow() {
        assert!(matches!(
            from_fixed(U256::MAX, 0, "size"),
            Err(DecodeError::Overflow("size"))
        ));
    }
}
