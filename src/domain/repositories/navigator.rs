//! Port for client application navigation.

use crate::domain::entities::Route;

/// Transitions the client application to another view.
///
/// # Implementations
///
/// - [`crate::infrastructure::navigation::ResponseNavigator`] - records the target for an HTTP redirect
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}
