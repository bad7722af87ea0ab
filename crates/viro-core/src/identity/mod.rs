//! Identity domain module.
//!
//! - `model`: The signed-in user (`UserIdentity`)
//! - `provider`: The external identity provider seam (`IdentityProvider`)
//! - `subscription`: Delivery of identity events into a `SessionController`

mod model;
mod provider;
mod subscription;

pub use model::UserIdentity;
pub use provider::IdentityProvider;
pub use subscription::{IdentityListener, IdentitySubscription};
