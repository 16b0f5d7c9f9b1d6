//! Payment gateway abstraction for methods that do not draw on the wallet.

use super::{
    errors::{WalletError, WalletResult},
    models::{GatewayReceipt, PaymentDetails, PaymentMethod},
};
use crate::auth::UserId;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use log::debug;

const MIN_CARD_DIGITS: usize = 13;
const MIN_CVV_DIGITS: usize = 3;

/// Collects money from an external payment method
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` cents to the payer using `details`.
    ///
    /// # Errors
    ///
    /// * `WalletError::UnsupportedMethod` - `details` names the wallet itself
    /// * `WalletError::PaymentDeclined` - The details were refused
    async fn charge(
        &self,
        user_id: &UserId,
        amount: i64,
        details: &PaymentDetails,
    ) -> WalletResult<GatewayReceipt>;
}

/// Gateway that accepts every well-formed request and invents a reference
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway;

impl SimulatedGateway {
    fn reference(method: PaymentMethod) -> WalletResult<String> {
        let prefix = method
            .reference_prefix()
            .ok_or_else(|| WalletError::UnsupportedMethod(method.to_string()))?;
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(12)
            .collect();
        Ok(format!("{prefix}-{}", suffix.to_uppercase()))
    }

    fn card_last_four(card_number: &str, cvv: &str) -> WalletResult<String> {
        let digits: String = card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if digits.len() < MIN_CARD_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(WalletError::PaymentDeclined(
                "Invalid card number".to_string(),
            ));
        }
        if cvv.len() < MIN_CVV_DIGITS || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(WalletError::PaymentDeclined("Invalid CVV".to_string()));
        }
        Ok(digits[digits.len() - 4..].to_string())
    }

    /// Accepts `MM/YY` expiring in `today`'s month or later
    fn check_expiry(expiry: &str, today: NaiveDate) -> WalletResult<()> {
        let declined = |reason: &str| -> WalletResult<()> {
            Err(WalletError::PaymentDeclined(reason.to_string()))
        };

        let expiry = expiry.trim();
        if expiry.is_empty() {
            return declined("Missing card expiry date");
        }
        let Some((month, year)) = expiry.split_once('/') else {
            return declined("Card expiry must be MM/YY");
        };
        if month.len() != 2 || year.len() != 2 {
            return declined("Card expiry must be MM/YY");
        }
        let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) else {
            return declined("Card expiry must be MM/YY");
        };
        if !(1..=12).contains(&month) {
            return declined("Invalid card expiry month");
        }
        if (2000 + year, month) < (today.year(), today.month()) {
            return declined("Card has expired");
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        user_id: &UserId,
        amount: i64,
        details: &PaymentDetails,
    ) -> WalletResult<GatewayReceipt> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let card_last_four = match details {
            PaymentDetails::Balance => {
                return Err(WalletError::UnsupportedMethod(
                    PaymentMethod::Balance.to_string(),
                ));
            }
            PaymentDetails::CreditCard {
                card_number,
                cvv,
                expiry,
            } => {
                let last_four = Self::card_last_four(card_number, cvv)?;
                Self::check_expiry(expiry, Utc::now().date_naive())?;
                Some(last_four)
            }
            _ => None,
        };

        let method = details.method();
        let reference = Self::reference(method)?;
        debug!("Simulated {method} charge of {amount} for {user_id}: {reference}");

        Ok(GatewayReceipt {
            method,
            reference,
            card_last_four,
        })
    }
}
