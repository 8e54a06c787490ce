use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use super::format::{parse_commission, round_commission};
use super::validator::{validate_cascade, CascadeCheck};
use crate::api::StoreCommissionRow;
use crate::hierarchy::PATH_SEPARATOR;

/// Settlement column suffixes, one per tier from the top
pub const TIER_CODES: [&str; 13] = [
    "AC", "BC", "CC", "DC", "EC", "FC", "GC", "HC", "IC", "JC", "KC", "LC", "MC",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub name: String,
    pub commission: Decimal,
}

/// One merchant card on the commission board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantCommission {
    pub id: String,
    pub name: String,
    pub status: MerchantStatus,
    /// Total commission the tiers must add up to (`terminal_C`)
    pub total_commission: Decimal,
    pub has_commission: bool,
    pub tiers: Vec<Tier>,
    /// The merchant's own terminal commission
    pub merchant_commission: Decimal,
    pub settlement_floor: Option<Decimal>,
    pub created_date: Option<String>,
    pub last_updated: Option<String>,
}

impl MerchantCommission {
    pub fn from_row(row: StoreCommissionRow) -> Self {
        let names: Vec<&str> = row
            .upper_path
            .as_deref()
            .map(|p| p.split(PATH_SEPARATOR).filter(|n| !n.trim().is_empty()).collect())
            .unwrap_or_default();

        if names.len() > TIER_CODES.len() {
            tracing::warn!(
                "merchant {} has {} tiers; only the first {} carry commission",
                row.id,
                names.len(),
                TIER_CODES.len()
            );
        }

        let tiers = names
            .iter()
            .take(TIER_CODES.len())
            .zip(TIER_CODES)
            .map(|(name, code)| Tier {
                name: name.trim().to_string(),
                commission: loose_decimal(row.extra.get(&format!("prime_{}", code))),
            })
            .collect();

        let merchant_commission = row
            .store_wallet
            .and_then(|w| w.terminal_commission)
            .map(round_commission)
            .unwrap_or(Decimal::ZERO);

        let status = match row.status.as_deref().map(str::trim) {
            Some("inactive") | Some("N") => MerchantStatus::Inactive,
            _ => MerchantStatus::Active,
        };

        Self {
            name: row.store_name,
            status,
            total_commission: row.terminal_total.map(round_commission).unwrap_or(Decimal::ZERO),
            has_commission: !merchant_commission.is_zero(),
            tiers,
            merchant_commission,
            settlement_floor: row.settlement_commission,
            created_date: date_part(row.store_basic_info.and_then(|i| i.join_date)),
            last_updated: date_part(
                row.store_commission_edit_logs
                    .and_then(|logs| logs.into_iter().next())
                    .and_then(|log| log.edit_date),
            ),
            id: row.id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MerchantStatus::Active
    }

    pub fn tier_values(&self) -> Vec<Decimal> {
        self.tiers.iter().map(|t| t.commission).collect()
    }

    /// Cascade check against the stored tier values
    pub fn check(&self) -> CascadeCheck {
        validate_cascade(&self.tier_values(), self.total_commission)
    }
}

fn loose_decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).map(round_commission).unwrap_or_default(),
        Some(Value::String(s)) => parse_commission(s),
        _ => Decimal::ZERO,
    }
}

/// `"2024-03-01 10:22:13"` → `"2024-03-01"`
fn date_part(raw: Option<String>) -> Option<String> {
    raw.and_then(|s| s.split_whitespace().next().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> StoreCommissionRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_path_tiers_and_dates() {
        let merchant = MerchantCommission::from_row(row(json!({
            "id": "m-9",
            "store_name": "Night Market",
            "upper_path": "HQ > Dist > Agency",
            "terminal_C": 20,
            "prime_AC": 10,
            "prime_BC": "5",
            "prime_CC": "5.004",
            "store_wallet": { "terminal_commission": "3" },
            "store_basic_info": { "join_date": "2023-11-02 09:00:00" },
            "store_commission_edit_logs": [{ "edit_date": "2024-02-10 18:30:00" }, { "edit_date": "2023-12-01" }],
            "settlement_commission": "1.5"
        })));

        let names: Vec<&str> = merchant.tiers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["HQ", "Dist", "Agency"]);
        assert_eq!(merchant.tier_values(), vec![Decimal::from(10), Decimal::from(5), Decimal::from(5)]);
        assert!(merchant.check().is_balanced());
        assert!(merchant.has_commission);
        assert_eq!(merchant.created_date.as_deref(), Some("2023-11-02"));
        assert_eq!(merchant.last_updated.as_deref(), Some("2024-02-10"));
        assert_eq!(merchant.settlement_floor, Some(Decimal::new(15, 1)));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let merchant = MerchantCommission::from_row(row(json!({ "id": 4, "upper_path": "HQ" })));
        assert_eq!(merchant.tier_values(), vec![Decimal::ZERO]);
        assert_eq!(merchant.total_commission, Decimal::ZERO);
        assert!(!merchant.has_commission);
        assert!(merchant.is_active());
        assert_eq!(merchant.created_date, None);
    }
}
