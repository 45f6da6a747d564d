use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    Hourly,
    Daily,
    Weekly,
}

impl PricingType {
    /// Hours in one billing unit.
    pub fn unit_hours(&self) -> i64 {
        match self {
            PricingType::Hourly => 1,
            PricingType::Daily => 24,
            PricingType::Weekly => 24 * 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingType::Hourly => "hourly",
            PricingType::Daily => "daily",
            PricingType::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => PricingType::Daily,
            "weekly" => PricingType::Weekly,
            _ => PricingType::Hourly,
        }
    }
}

/// A location-scoped rate card entry. Prices are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenPricingOption {
    pub id: String,
    pub location_id: String,
    pub pricing_type: PricingType,
    pub price_per_unit_minor: i64,
}
