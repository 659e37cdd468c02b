//! Corridor reference data: configured remittance routes with their
//! fee and payout-method policy. Read-only at runtime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::{CurrencyCode, Money};
use super::payout::PayoutMethod;

/// A (source-currency, target-currency) route with its own fee and
/// payout-method policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Corridor {
    pub source_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    pub enabled: bool,
    #[schema(value_type = String, example = "1.0")]
    pub fee_percent: Decimal,
    pub fee_minimum: Money,
    #[schema(value_type = String, example = "0.5")]
    pub margin_percent: Decimal,
    pub payout_methods: Vec<PayoutMethod>,
}

impl Corridor {
    pub fn supports(&self, method: PayoutMethod) -> bool {
        self.payout_methods.contains(&method)
    }

    /// The built-in corridor table used when no external configuration
    /// is supplied.
    pub fn builtin() -> Vec<Corridor> {
        fn code(c: &str) -> CurrencyCode {
            CurrencyCode::parse(c).expect("builtin corridor currency code")
        }
        fn corridor(
            source: &str,
            target: &str,
            enabled: bool,
            fee_percent: &str,
            fee_minimum: &str,
            margin_percent: &str,
            payout_methods: Vec<PayoutMethod>,
        ) -> Corridor {
            Corridor {
                source_currency: code(source),
                target_currency: code(target),
                enabled,
                fee_percent: fee_percent.parse().expect("builtin fee percent"),
                fee_minimum: Money::new(code(source), fee_minimum.parse().expect("builtin fee minimum")),
                margin_percent: margin_percent.parse().expect("builtin margin percent"),
                payout_methods,
            }
        }

        use PayoutMethod::*;
        vec![
            corridor("SGD", "PHP", true, "1.0", "2.00", "0.5", vec![BankAccount, MobileWallet, CashPickup]),
            corridor("SGD", "INR", true, "0.8", "2.50", "0.4", vec![BankAccount, MobileWallet]),
            corridor("SGD", "IDR", true, "1.2", "2.00", "0.6", vec![BankAccount, MobileWallet, CashPickup]),
            corridor("SGD", "MYR", true, "0.9", "1.50", "0.4", vec![BankAccount]),
            corridor("USD", "PHP", true, "1.5", "3.00", "0.5", vec![BankAccount, MobileWallet, CashPickup]),
            corridor("SGD", "MMK", false, "2.0", "4.00", "1.0", vec![CashPickup]),
        ]
    }
}
