//! radar-core: transaction model, categories, and amount/date helpers for RupeeRadar

pub mod amount;
pub mod category;
pub mod date;
pub mod transaction;

pub use amount::parse_amount;
pub use category::Category;
pub use transaction::{Transaction, TxnType};
