pub mod form;
pub mod loader;
pub mod schema;

pub use form::{parse_list, FormInput};
pub use loader::{load_settings, load_settings_from_str};
pub use schema::Settings;
