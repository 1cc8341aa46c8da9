use crate::error::FpkitError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// Signed money amount with two decimal places, held as whole cents.
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping or panicking,
/// so totals over any input are defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn saturating_sub(self, rhs: Amount) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiply by `factor`, rounding half away from zero to the cent.
    pub fn scale(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor).round() as i64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = FpkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FpkitError::InvalidArgument(format!("invalid amount '{s}'"));
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty()
            || frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: Amount,
    pub kind: TransactionKind,
    pub category: String,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
        kind: TransactionKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
        }
    }
}

/// The fixed month of transactions the report demo runs on.
pub fn sample_transactions() -> Vec<Transaction> {
    use TransactionKind::{Expense, Income};
    vec![
        Transaction::new("T1", "Salary", Amount::from_units(3000), Income, "income"),
        Transaction::new("T2", "Rent", Amount::from_units(1200), Expense, "housing"),
        Transaction::new("T3", "Groceries", Amount::from_units(150), Expense, "food"),
        Transaction::new("T4", "Freelance Gig", Amount::from_units(500), Income, "income"),
        Transaction::new("T5", "Electricity", Amount::from_units(80), Expense, "utilities"),
        Transaction::new("T6", "Dining Out", Amount::from_units(75), Expense, "food"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_display_pads_cents() {
        assert_eq!(Amount::from_cents(150500).to_string(), "1505.00");
        assert_eq!(Amount::from_cents(24750).to_string(), "247.50");
        assert_eq!(Amount::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn amount_parses_decimal_strings() {
        assert_eq!("1505.00".parse::<Amount>().unwrap(), Amount::from_cents(150500));
        assert_eq!("247.5".parse::<Amount>().unwrap(), Amount::from_cents(24750));
        assert_eq!("80".parse::<Amount>().unwrap(), Amount::from_units(80));
        assert_eq!("-3.07".parse::<Amount>().unwrap(), Amount::from_cents(-307));
        assert!("1.234".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
    }

    #[test]
    fn amount_scale_rounds_to_cent() {
        assert_eq!(Amount::from_units(225).scale(1.10), Amount::from_cents(24750));
        assert_eq!(Amount::from_units(1200).scale(1.10), Amount::from_units(1320));
        assert_eq!(Amount::from_cents(1).scale(0.5), Amount::from_cents(1));
    }

    #[test]
    fn amount_arithmetic_saturates() {
        let huge: Amount = "90000000000000000.00".parse().unwrap();
        assert_eq!(huge + huge, Amount::from_cents(i64::MAX));

        let mut total = Amount::from_cents(i64::MIN + 1);
        total += Amount::from_cents(-5);
        assert_eq!(total, Amount::from_cents(i64::MIN));

        assert_eq!(Amount::from_units(i64::MAX), Amount::from_cents(i64::MAX));
        assert_eq!(
            Amount::from_cents(i64::MIN).saturating_sub(Amount::from_cents(1)),
            Amount::from_cents(i64::MIN)
        );
    }

    #[test]
    fn transaction_json_uses_string_amount() {
        let tx = &sample_transactions()[1];
        let json = serde_json::to_value(tx).unwrap();
        assert_eq!(json["amount"], "1200.00");
        assert_eq!(json["kind"], "expense");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(&back, tx);
    }

    #[test]
    fn sample_has_six_transactions() {
        let txs = sample_transactions();
        assert_eq!(txs.len(), 6);
        assert_eq!(txs[0].id, "T1");
        assert_eq!(txs[5].description, "Dining Out");
    }
}
