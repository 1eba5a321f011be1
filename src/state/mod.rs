// Public API - what other modules can use
pub use handlers::{
    add_state, delete_state, get_state, list_states, list_states_for_country, update_state,
};
pub use service::StateService;
pub use types::StateDto;

// Internal modules
mod handlers;
mod service;
mod types;
