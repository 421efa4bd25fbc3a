//! The six retail entities and their cleaners

use crate::clean::{
    CardCleaner, DateEventCleaner, OrdersCleaner, ProductCleaner, StoreCleaner, UserCleaner,
    WeightConverter,
};
use crate::etl::Transformer;
use crate::table::Table;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cleaner for one entity, erased to a common type
pub type EntityCleaner = Box<dyn Transformer<Input = Table, Output = Table>>;

/// One logical table of retail data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    Dates,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Users,
        Entity::Cards,
        Entity::Stores,
        Entity::Products,
        Entity::Orders,
        Entity::Dates,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Cards => "cards",
            Entity::Stores => "stores",
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::Dates => "dates",
        }
    }

    /// The cleaner that turns this entity's raw table into its loadable form
    ///
    /// Products are cleaned and then have their weights converted.
    pub fn cleaner(&self) -> EntityCleaner {
        match self {
            Entity::Users => Box::new(UserCleaner),
            Entity::Cards => Box::new(CardCleaner),
            Entity::Stores => Box::new(StoreCleaner),
            Entity::Products => Box::new(ProductCleaner.then(WeightConverter)),
            Entity::Orders => Box::new(OrdersCleaner),
            Entity::Dates => Box::new(DateEventCleaner),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Entity {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Entity::ALL
            .into_iter()
            .find(|e| e.name() == lower)
            .ok_or_else(|| {
                eyre::eyre!(
                    "Unknown entity '{}'. Expected one of: {}",
                    s,
                    Entity::ALL.map(|e| e.name()).join(", ")
                )
            })
    }
}
