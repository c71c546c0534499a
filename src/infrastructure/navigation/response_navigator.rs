//! Navigation recorded for the HTTP response.

use std::sync::Mutex;

use crate::domain::entities::Route;
use crate::domain::repositories::Navigator;

/// Records where the client should go; the HTTP handler turns it into a
/// redirect once the flow finishes.
#[derive(Default)]
pub struct ResponseNavigator {
    destination: Mutex<Option<Route>>,
}

impl ResponseNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last route navigated to, if any.
    pub fn destination(&self) -> Option<Route> {
        match self.destination.lock() {
            Ok(destination) => destination.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for ResponseNavigator {
    fn navigate(&self, route: &Route) {
        let mut destination = match self.destination.lock() {
            Ok(destination) => destination,
            Err(poisoned) => poisoned.into_inner(),
        };
        *destination = Some(route.clone());
    }
}
