// Public API - what other modules can use
pub use handlers::{add_country, delete_country, get_country, list_countries, update_country};
pub use service::CountryService;
pub use types::CountryDto;

// Internal modules
mod handlers;
mod service;
mod types;
