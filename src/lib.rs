pub mod cli;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod resource;
pub mod session;

pub use confirm::ConfirmationGate;
pub use controller::{ControllerState, ModalState, ResourceController};
pub use dispatch::{Navigator, RequestDispatcher};
pub use error::ApiError;
pub use notify::{NotificationBridge, Severity};
pub use resource::{Draft, FieldSpec, ResourceDescriptor};
pub use session::SessionContext;
