//! Media processing actions.

mod mux;

pub use mux::mux;
