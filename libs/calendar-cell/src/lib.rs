pub mod models;
pub mod services;

pub use models::CalendarError;
pub use services::{CalendarSource, GoogleCalendarClient};
