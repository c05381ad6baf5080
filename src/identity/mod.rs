//! Identity, authorization, and session gating.
//! Keep the public surface thin and split implementation across sub-modules.

pub mod authz;
mod gate;
mod idle;
mod principal;
mod provider;

pub use gate::{drive, GateState, GateView, SessionGate};
pub use idle::InactivityMonitor;
pub use principal::Principal;
pub use provider::{IdentityService, LocalIdentityConfig, LocalIdentityService};
