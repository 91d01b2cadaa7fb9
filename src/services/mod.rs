pub mod cache;
pub mod signal_service;
pub mod signals;
pub mod symbol_service;

pub use cache::{CacheStats, TtlCache};
pub use signal_service::SignalService;
pub use signals::{SignalEngine, SystemClock};
pub use symbol_service::SymbolService;
