mod basis;
pub mod errors;
mod measurements;

pub use basis::Basis;
pub use measurements::{check_bit, measure, measure_all};
