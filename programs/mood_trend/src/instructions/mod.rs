pub mod get_trend_handle;
pub mod initialize;
pub mod list_days;
pub mod store_mood;
pub mod verify_access;

pub use get_trend_handle::*;
pub use initialize::*;
pub use list_days::*;
pub use store_mood::*;
pub use verify_access::*;
