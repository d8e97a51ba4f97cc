mod reporter;

pub use reporter::*;
