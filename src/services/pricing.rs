use chrono::{Duration, NaiveDateTime};

use crate::models::{PricingType, ScreenPricingOption};

/// Result of pricing a booking window against a rate card entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Billable hours in the window, any started hour counted in full.
    pub duration_hours: i64,
    /// Billing units charged, never less than one.
    pub units: i64,
    pub total_minor: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PricingError {
    EndNotAfterStart,
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::EndNotAfterStart => {
                write!(f, "booking window must end after it starts")
            }
        }
    }
}

/// Hours billed for a window. Partial hours always round up, so a window of
/// 1 hour and 1 minute bills as 2 hours. This is policy, not rounding noise.
pub fn billable_hours(
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<i64, PricingError> {
    let seconds = (*end - *start).num_seconds();
    if seconds <= 0 {
        return Err(PricingError::EndNotAfterStart);
    }
    Ok((seconds + 3599) / 3600)
}

/// Prices a window against a pricing option: units are the billable hours
/// converted to the option's billing unit (rounded up, clamped to one), and
/// the total is units times the unit price.
pub fn quote(
    option: &ScreenPricingOption,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Quote, PricingError> {
    let hours = billable_hours(start, end)?;
    let unit_hours = option.pricing_type.unit_hours();
    let units = ((hours + unit_hours - 1) / unit_hours).max(1);

    Ok(Quote {
        duration_hours: hours,
        units,
        total_minor: units * option.price_per_unit_minor,
    })
}

/// Default schedule end used when a pricing option is first selected: one
/// billing unit after the start.
pub fn default_end(start: &NaiveDateTime, pricing_type: PricingType) -> NaiveDateTime {
    *start + Duration::hours(pricing_type.unit_hours())
}
