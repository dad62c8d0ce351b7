//! Terminal login front-end
//!
//! Terminal user interface using Ratatui.

mod app;
pub mod backend;
mod choice;
pub mod flow;
mod form;
mod input;
pub mod log_capture;
mod log_view;
mod msgbox;
mod ui;
pub mod view;
mod view_stack;

pub use app::{run, App, AppContext, AppEvent};
pub use backend::{AuthSession, Backend, BackendCommand, BackendResponse};
pub use log_capture::{LogBuffer, LogLine};
