pub mod select;

pub use select::{SelectArgs, SelectError};
