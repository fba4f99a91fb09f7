//! Domain types for QuoteLens

pub mod bar;
pub mod period;
pub mod series;
pub mod symbol;

pub use bar::Bar;
pub use period::{Interval, Period};
pub use series::Series;
pub use symbol::{CompanyQuery, Symbol};
