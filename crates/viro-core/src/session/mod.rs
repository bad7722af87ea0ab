//! Session domain module.
//!
//! # Module Structure
//!
//! - `state`: The per-page-session state (`SessionState`)
//! - `controller`: Identity handling, generation flow and history
//!   operations over that state (`SessionController`)

mod controller;
#[cfg(test)]
mod controller_test;
mod state;

pub use controller::SessionController;
pub use state::SessionState;
