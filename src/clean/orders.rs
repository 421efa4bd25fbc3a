//! Orders table cleaner

use crate::etl::Transformer;
use crate::table::Table;
use eyre::Result;

/// Personal or junk columns removed from the orders table
pub const ORDERS_DROPPED_COLUMNS: [&str; 3] = ["first_name", "last_name", "1"];

/// Drop the personal and junk columns from the orders table
///
/// A table that already lacks all of them is returned unchanged, so the
/// cleaner can be re-run on its own output. A table with only some of them
/// is rejected.
pub fn clean_orders_data(table: Table) -> Result<Table> {
    let (present, missing): (Vec<&str>, Vec<&str>) = ORDERS_DROPPED_COLUMNS
        .into_iter()
        .partition(|name| table.has_column(name));

    if present.is_empty() {
        log::debug!("orders: nothing to drop");
        return Ok(table);
    }
    if !missing.is_empty() {
        eyre::bail!("orders: missing required column(s): {}", missing.join(", "));
    }
    table.drop_columns(&present)
}

/// Transformer form of [`clean_orders_data`]
pub struct OrdersCleaner;

impl Transformer for OrdersCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        clean_orders_data(input)
    }
}
