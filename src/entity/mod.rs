//! Entity collections (companies, employees) and the client that drives them.

mod client;

pub use client::EntityClient;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Employee,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Company, EntityKind::Employee];

    /// Last path segment of the collection endpoint.
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::Employee => "employees",
        }
    }

    pub fn from_collection_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection_name() == name)
    }
}

/// A company or employee as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(alias = "Name")]
    pub name: String,
}

/// Fresh numeric code for building entity names that won't collide across
/// test runs.
pub fn entity_code() -> String {
    (Uuid::new_v4().as_u128() as u64).to_string()
}
