use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
        }
    }

    /// Parses the stored text form. Anything other than `paid` reads as unpaid.
    pub fn from_stored(s: &str) -> Self {
        if s.eq_ignore_ascii_case("paid") {
            Self::Paid
        } else {
            Self::Unpaid
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Paid => Self::Unpaid,
            Self::Unpaid => Self::Paid,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bill to collect. Amounts are carried in both currencies as printed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub code: String,
    #[serde(rename = "branchID")]
    pub branch_id: String,
    #[serde(rename = "installationID")]
    pub installation_id: String,
    pub name: String,
    #[serde(rename = "billLBP")]
    pub bill_lbp: f64,
    #[serde(rename = "billUSD")]
    pub bill_usd: f64,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<String>,
}

impl Bill {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
