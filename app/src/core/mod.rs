pub mod id;
pub mod unit;
