//! Per-entity cleaners
//!
//! Each cleaner takes a raw table, validates that the columns it needs are
//! present, then applies its filters and coercions. Value-level defects turn
//! into nulls; only the documented filters drop rows.

mod cards;
mod dates;
mod orders;
mod parse;
mod products;
mod stores;
mod users;
mod weight;

pub use cards::{CardCleaner, clean_card_data};
pub use dates::{DateEventCleaner, TIME_PERIODS, clean_date_data};
pub use orders::{ORDERS_DROPPED_COLUMNS, OrdersCleaner, clean_orders_data};
pub use parse::{
    MonthYear, coerce_date, contains_digit, parse_date_lenient, parse_date_strict,
    parse_month_year,
};
pub use products::{ProductCleaner, clean_products_data};
pub use stores::{StoreCleaner, called_clean_store_data};
pub use users::{UserCleaner, clean_user_data};
pub use weight::{WeightConverter, WeightUnit, convert_product_weights, parse_weight};
