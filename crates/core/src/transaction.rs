use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Category assigned when no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// `In` iff the amount is strictly positive; zero counts as `Out`.
    pub fn from_amount(amount: Money) -> Self {
        if amount.is_positive() {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// A bank export row after the amount and direction have been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub merchant_name: String,
    pub amount: Money,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub merchant_name: String,
    pub amount: Money,
    pub direction: Direction,
    pub category: String,
}

impl CategorizedTransaction {
    pub fn new(tx: Transaction, category: impl Into<String>) -> Self {
        CategorizedTransaction {
            merchant_name: tx.merchant_name,
            amount: tx.amount,
            direction: tx.direction,
            category: category.into(),
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn direction_follows_sign() {
        assert_eq!(Direction::from_amount(Money::new(dec!(100))), Direction::In);
        assert_eq!(Direction::from_amount(Money::new(dec!(-50))), Direction::Out);
    }

    #[test]
    fn zero_amount_is_out() {
        assert_eq!(Direction::from_amount(Money::zero()), Direction::Out);
    }

    #[test]
    fn direction_parse_is_case_insensitive() {
        assert_eq!(" IN ".parse::<Direction>(), Ok(Direction::In));
        assert_eq!("Out".parse::<Direction>(), Ok(Direction::Out));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::In.to_string(), "in");
        assert_eq!(Direction::Out.to_string(), "out");
    }

    #[test]
    fn categorized_keeps_transaction_fields() {
        let tx = Transaction {
            merchant_name: "Netflix".to_string(),
            amount: Money::new(dec!(-15.99)),
            direction: Direction::Out,
        };
        let ctx = CategorizedTransaction::new(tx, UNCATEGORIZED);
        assert_eq!(ctx.merchant_name, "Netflix");
        assert_eq!(ctx.amount, Money::new(dec!(-15.99)));
        assert!(ctx.is_uncategorized());
    }
}
