pub mod access_grant;
pub mod encrypted_scalar;
pub mod mood_ledger;
pub mod trend;

pub use access_grant::*;
pub use encrypted_scalar::*;
pub use mood_ledger::*;
pub use trend::*;
