pub mod agent;
pub mod love;
pub mod market;
pub mod nonce;

pub use agent::*;
pub use love::*;
pub use market::*;
pub use nonce::*;
