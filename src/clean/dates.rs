//! Date-event cleaner

use crate::etl::Transformer;
use crate::schema::DATE_EVENTS;
use crate::table::Table;
use eyre::Result;

/// Recognised `time_period` labels
pub const TIME_PERIODS: [&str; 4] = ["Evening", "Morning", "Midday", "Late_Hours"];

/// Keep only rows whose `time_period` mentions a recognised period
///
/// The match is a substring test on the rendered cell, so corrupted rows
/// (random strings, nulls) fall out.
pub fn clean_date_data(table: Table) -> Result<Table> {
    DATE_EVENTS.validate(&table)?;

    let before = table.len();
    let table = table.filter_by("time_period", |v| {
        let text = v.render();
        TIME_PERIODS.iter().any(|period| text.contains(period))
    })?;
    log::debug!("date_events: dropped {} row(s)", before - table.len());

    DATE_EVENTS.apply_kinds(table)
}

/// Transformer form of [`clean_date_data`]
pub struct DateEventCleaner;

impl Transformer for DateEventCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        clean_date_data(input)
    }
}
