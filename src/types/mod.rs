pub mod calendar;
pub mod normal;
pub mod period;
pub mod series;
pub mod station;
pub mod unit;
