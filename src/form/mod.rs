pub mod service;
pub mod state;

pub use service::FormController;
pub use state::{FormField, FormState};
