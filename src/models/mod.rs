pub mod identity;
pub mod payment;
pub mod summary;

pub use identity::{IdentityKey, PayeeDetails};
pub use payment::{LineEnding, Payment, PaymentBatch};
pub use summary::RunSummary;
