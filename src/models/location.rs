use serde::{Deserialize, Serialize};

/// A physical screen site. Reference data for the booking flow; bookings may
/// only target active locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenLocation {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub address_en: String,
    pub address_ar: String,
    pub city_en: String,
    pub city_ar: String,
    pub active: bool,
}
