pub mod authorize_usage;
pub mod clone_agent;
pub mod get_agent;
pub mod initialize;
pub mod love_agent;
pub mod mint_agent;
pub mod set_verifier;
pub mod stake_on_agent;
pub mod transfer_agent;

pub use authorize_usage::*;
pub use clone_agent::*;
pub use get_agent::*;
pub use initialize::*;
pub use love_agent::*;
pub use mint_agent::*;
pub use set_verifier::*;
pub use stake_on_agent::*;
pub use transfer_agent::*;
