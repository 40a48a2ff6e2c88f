pub mod aggregates;
pub mod restaurant;

pub use aggregates::*;
pub use restaurant::*;
