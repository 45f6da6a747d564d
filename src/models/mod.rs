pub mod booking;
pub mod invoice;
pub mod location;
pub mod pricing;

pub use booking::{BookingStatus, MediaType, ScreenBooking};
pub use invoice::{Invoice, InvoiceStatus};
pub use location::ScreenLocation;
pub use pricing::{PricingType, ScreenPricingOption};
