//! Identity provider integration.
//!
//! The provider's popup window reports back through HTTP callbacks
//! (see [`crate::web::handlers::popup`]); [`PopupBroker`] hands that result to
//! the login flow waiting in [`PopupIdentityProvider`].

mod popup_broker;
mod popup_identity_provider;

pub use popup_broker::{PopupBroker, PopupId, PopupResult};
pub use popup_identity_provider::PopupIdentityProvider;
