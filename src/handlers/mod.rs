pub mod admin;
pub mod bookings;
pub mod health;
pub mod invoices;
pub mod locations;
pub mod media;
