pub mod city_view;
pub mod column_normalizer;
pub mod country_view;
pub mod cuisine_view;
pub mod data_cleaner;
pub mod filter_engine;
pub mod frames;
pub mod lookup;
pub mod overview_view;

pub use city_view::*;
pub use column_normalizer::*;
pub use country_view::*;
pub use cuisine_view::*;
pub use data_cleaner::*;
pub use filter_engine::*;
pub use overview_view::*;
