pub mod error;
pub mod event;
pub mod patient;
pub mod window;

pub use error::AppError;
pub use event::CalendarEvent;
pub use patient::PatientRecord;
pub use window::ReportWindow;
