pub mod market;
pub mod price;
pub mod signals;

pub use market::*;
pub use price::*;
pub use signals::*;
