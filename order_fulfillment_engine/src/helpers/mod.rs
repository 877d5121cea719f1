mod gateway_signature;

pub use gateway_signature::{calculate_signature, verify_signature};
