//! Per-entity column schemas
//!
//! Each cleaner validates its input against one of these before touching any
//! data, so a missing column fails fast with every absent name listed.

use crate::table::{ColumnKind, Table};
use eyre::Result;

/// A required column and the kind it carries after cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn field(name: &'static str, kind: ColumnKind) -> Field {
    Field { name, kind }
}

/// Ordered list of fields an entity's raw table must provide
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: &'static [Field],
}

impl EntitySchema {
    /// Names of required fields missing from `table`
    pub fn missing(&self, table: &Table) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|f| f.name)
            .filter(|name| !table.has_column(name))
            .collect()
    }

    /// Fail if any required field is missing
    pub fn validate(&self, table: &Table) -> Result<()> {
        let missing = self.missing(table);
        if !missing.is_empty() {
            eyre::bail!(
                "{}: missing required column(s): {}",
                self.entity,
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Tag every field that has a concrete kind
    ///
    /// Fields declared `Any` are left alone (they may have been dropped or
    /// renamed by the cleaner).
    pub fn apply_kinds(&self, table: Table) -> Result<Table> {
        self.fields
            .iter()
            .filter(|f| f.kind != ColumnKind::Any)
            .try_fold(table, |table, f| table.set_kind(f.name, f.kind))
    }
}

pub const USERS: EntitySchema = EntitySchema {
    entity: "users",
    fields: &[
        field("first_name", ColumnKind::Text),
        field("last_name", ColumnKind::Text),
        field("country", ColumnKind::Category),
        field("country_code", ColumnKind::Category),
        field("date_of_birth", ColumnKind::Date),
        field("join_date", ColumnKind::Date),
        field("company", ColumnKind::Category),
        field("email_address", ColumnKind::Text),
        field("user_uuid", ColumnKind::Text),
        field("phone_number", ColumnKind::Text),
    ],
};

pub const CARDS: EntitySchema = EntitySchema {
    entity: "cards",
    fields: &[
        field("card_number", ColumnKind::Text),
        field("expiry_date", ColumnKind::Text),
        field("date_payment_confirmed", ColumnKind::Date),
        field("card_provider", ColumnKind::Category),
    ],
};

pub const STORES: EntitySchema = EntitySchema {
    entity: "stores",
    fields: &[
        field("continent", ColumnKind::Category),
        field("lat", ColumnKind::Any),
        field("store_type", ColumnKind::Category),
        field("store_code", ColumnKind::Text),
        field("country_code", ColumnKind::Category),
        field("staff_numbers", ColumnKind::Text),
        field("address", ColumnKind::Text),
        field("locality", ColumnKind::Text),
        field("opening_date", ColumnKind::Date),
    ],
};

pub const PRODUCTS: EntitySchema = EntitySchema {
    entity: "products",
    fields: &[
        field("product_price", ColumnKind::Any),
        field("category", ColumnKind::Category),
        field("date_added", ColumnKind::Date),
        field("removed", ColumnKind::Category),
        field("weight", ColumnKind::Any),
    ],
};

pub const DATE_EVENTS: EntitySchema = EntitySchema {
    entity: "date_events",
    fields: &[field("time_period", ColumnKind::Category)],
};
