pub mod media;
pub mod pricing;
pub mod review;
pub mod wizard;
