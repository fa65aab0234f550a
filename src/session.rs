//! Session credential types shared by the coordinator and its stores.

pub mod claims;

mod credential;
mod secret;

pub use credential::*;
pub use secret::*;
