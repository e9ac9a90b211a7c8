//! Data models

pub mod reading;
pub mod verdict;
pub mod record;

pub use reading::*;
pub use verdict::*;
pub use record::*;
