//! Row models for the storage tables.

mod product_record;
mod session_record;
mod turn_record;
mod user_record;

pub use product_record::{first_word_key, ProductRecord};
pub use session_record::SessionRecord;
pub use turn_record::TurnRecord;
pub use user_record::UserRecord;
