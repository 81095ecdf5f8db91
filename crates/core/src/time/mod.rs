pub mod window;

pub use window::{resolve_end_date, DateRange};
