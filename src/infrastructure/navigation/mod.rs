//! Navigation adapters.

mod response_navigator;

pub use response_navigator::ResponseNavigator;
