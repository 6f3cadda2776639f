//! Per-user settings: the display currency and the user's profile.

mod currency;
mod db;
mod page;
mod profile;

pub use currency::update_currency_endpoint;
pub use db::{create_user_settings_table, get_currency_code, get_user_currency, set_currency_code};
pub use page::get_settings_page;
pub use profile::update_profile_endpoint;
