use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::format::format_commission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommissionError {
    #[error("Tier commissions exceed the merchant total by {}%", pct(.excess))]
    Over { excess: Decimal },

    #[error("Tier commissions fall short of the merchant total by {}%", pct(.shortfall))]
    Under { shortfall: Decimal },

    #[error("No commission has been allocated to any tier")]
    Unallocated,

    #[error(
        "Merchant commission {}% exceeds the tier total {}%",
        pct(.terminal),
        pct(.tiers)
    )]
    TerminalExceedsTiers { terminal: Decimal, tiers: Decimal },

    #[error(
        "Merchant commission {}% is below the settlement floor {}%",
        pct(.terminal),
        pct(.floor)
    )]
    BelowSettlementFloor { terminal: Decimal, floor: Decimal },

    #[error("Inactive merchant {0} cannot be edited")]
    InactiveMerchant(String),

    #[error("Merchant {0} is not on the current page")]
    UnknownMerchant(String),

    #[error("Merchant {merchant} has {count} tiers; tier {index} does not exist")]
    UnknownTier { merchant: String, index: usize, count: usize },
}

fn pct(value: &Decimal) -> String {
    format_commission(*value)
}

/// Outcome of comparing the tier sum with the merchant total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "difference", rename_all = "snake_case")]
pub enum CascadeStatus {
    Balanced,
    Over(Decimal),
    Under(Decimal),
    Unallocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeCheck {
    pub sum: Decimal,
    pub total: Decimal,
    pub status: CascadeStatus,
}

impl CascadeCheck {
    pub fn is_balanced(&self) -> bool {
        self.status == CascadeStatus::Balanced
    }

    /// Every status except `Balanced` blocks a save
    pub fn ensure_saveable(&self) -> Result<(), CommissionError> {
        match self.status {
            CascadeStatus::Balanced => Ok(()),
            CascadeStatus::Over(excess) => Err(CommissionError::Over { excess }),
            CascadeStatus::Under(shortfall) => Err(CommissionError::Under { shortfall }),
            CascadeStatus::Unallocated => Err(CommissionError::Unallocated),
        }
    }
}

pub fn validate_cascade(tiers: &[Decimal], total: Decimal) -> CascadeCheck {
    let sum: Decimal = tiers.iter().copied().sum();

    let status = if sum.is_zero() {
        CascadeStatus::Unallocated
    } else if sum == total {
        CascadeStatus::Balanced
    } else if sum > total {
        CascadeStatus::Over(sum - total)
    } else {
        CascadeStatus::Under(total - sum)
    };

    CascadeCheck { sum, total, status }
}

/// The merchant's own commission must sit between the settlement floor and the
/// tier total
pub fn validate_terminal(terminal: Decimal, tier_sum: Decimal, floor: Option<Decimal>) -> Result<(), CommissionError> {
    if terminal > tier_sum {
        return Err(CommissionError::TerminalExceedsTiers { terminal, tiers: tier_sum });
    }
    if let Some(floor) = floor {
        if terminal < floor {
            return Err(CommissionError::BelowSettlementFloor { terminal, floor });
        }
    }
    Ok(())
}
