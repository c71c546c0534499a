//! HTML handlers for the login page, the provider popup and the home view.

mod home;
mod login;
pub mod popup;

pub use home::home_handler;
pub use login::{LoginForm, login_page_handler, login_submit_handler};
pub use popup::{popup_callback_handler, popup_closed_handler, popup_start_handler};
