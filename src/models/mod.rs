mod statistics;
mod validators;

pub use statistics::*;
