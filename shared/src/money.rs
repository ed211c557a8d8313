//! COD and net receipt rules
//!
//! Every figure is computed with checked arithmetic and capped at
//! [`MAX_AMOUNT_VND`]; anything larger is reported as [`MoneyError`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{OrderItem, ShippingPayer};

/// Largest amount, in đồng, a price, fee or order total may reach
pub const MAX_AMOUNT_VND: i64 = 1_000_000_000_000;

pub fn max_amount() -> Decimal {
    Decimal::from(MAX_AMOUNT_VND)
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount exceeds the maximum of {} VND", MAX_AMOUNT_VND)]
    OutOfRange,
}

/// Derived money figures of one order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub shipping_payer: ShippingPayer,
    pub cod: Decimal,
    pub net_received: Decimal,
}

fn capped(amount: Option<Decimal>) -> Result<Decimal, MoneyError> {
    amount
        .filter(|a| a.abs() <= max_amount())
        .ok_or(MoneyError::OutOfRange)
}

/// Sum of price x quantity over (price, quantity) pairs
pub fn line_subtotal<I>(lines: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |total, (price, quantity)| {
            let line = capped(price.checked_mul(Decimal::from(quantity)))?;
            capped(total.checked_add(line))
        })
}

pub fn product_subtotal(items: &[OrderItem]) -> Result<Decimal, MoneyError> {
    line_subtotal(items.iter().map(|item| (item.price, item.quantity)))
}

/// Amount the courier collects from the customer
pub fn cod(
    subtotal: Decimal,
    shipping_fee: Decimal,
    payer: ShippingPayer,
) -> Result<Decimal, MoneyError> {
    match payer {
        ShippingPayer::Shop => capped(Some(subtotal)),
        ShippingPayer::Customer => capped(subtotal.checked_add(shipping_fee)),
    }
}

/// Amount left for the shop once the courier's fee is paid.
///
/// `cod - shipping_fee` holds for both payers, so this is the only net
/// receipt formula used anywhere.
pub fn net_received(cod: Decimal, shipping_fee: Decimal) -> Result<Decimal, MoneyError> {
    capped(cod.checked_sub(shipping_fee))
}

pub fn settle(
    subtotal: Decimal,
    shipping_fee: Decimal,
    payer: ShippingPayer,
) -> Result<Settlement, MoneyError> {
    let cod = cod(subtotal, shipping_fee, payer)?;
    Ok(Settlement {
        subtotal,
        shipping_fee,
        shipping_payer: payer,
        cod,
        net_received: net_received(cod, shipping_fee)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vnd(amount: i64) -> Decimal {
        Decimal::from(amount)
    }

    #[test]
    fn test_shop_pays_shipping() {
        let s = settle(vnd(500_000), vnd(30_000), ShippingPayer::Shop).unwrap();
        assert_eq!(s.cod, vnd(500_000));
        assert_eq!(s.net_received, vnd(470_000));
    }

    #[test]
    fn test_customer_pays_shipping() {
        let s = settle(vnd(500_000), vnd(30_000), ShippingPayer::Customer).unwrap();
        assert_eq!(s.cod, vnd(530_000));
        assert_eq!(s.net_received, vnd(500_000));
    }

    #[test]
    fn test_line_subtotal() {
        let total = line_subtotal([(vnd(500_000), 2), (vnd(20_000), 1)]);
        assert_eq!(total, Ok(vnd(1_020_000)));
        assert_eq!(line_subtotal(Vec::<(Decimal, u32)>::new()), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        assert_eq!(line_subtotal([(Decimal::MAX, 2)]), Err(MoneyError::OutOfRange));
        assert_eq!(
            line_subtotal([(max_amount(), 1), (vnd(1), 1)]),
            Err(MoneyError::OutOfRange)
        );
        assert_eq!(
            cod(max_amount(), vnd(30_000), ShippingPayer::Customer),
            Err(MoneyError::OutOfRange)
        );
        assert_eq!(cod(max_amount(), vnd(30_000), ShippingPayer::Shop), Ok(max_amount()));
        assert_eq!(net_received(Decimal::MIN, Decimal::MAX), Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_free_shipping() {
        for payer in [ShippingPayer::Shop, ShippingPayer::Customer] {
            let s = settle(vnd(350_000), Decimal::ZERO, payer).unwrap();
            assert_eq!(s.cod, s.net_received);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Net receipt is COD minus fee whoever pays shipping
        #[test]
        fn prop_net_is_cod_minus_fee(
            subtotal in 0i64..100_000_000,
            fee in 0i64..1_000_000,
            customer_pays in any::<bool>(),
        ) {
            let payer = if customer_pays { ShippingPayer::Customer } else { ShippingPayer::Shop };
            let s = settle(vnd(subtotal), vnd(fee), payer).unwrap();
            prop_assert_eq!(s.net_received, s.cod - vnd(fee));
        }

        /// Customer-paid shipping never reduces the shop's receipt
        #[test]
        fn prop_customer_payer_nets_subtotal(
            subtotal in 0i64..100_000_000,
            fee in 0i64..1_000_000,
        ) {
            let s = settle(vnd(subtotal), vnd(fee), ShippingPayer::Customer).unwrap();
            prop_assert_eq!(s.net_received, vnd(subtotal));
        }
    }
}
