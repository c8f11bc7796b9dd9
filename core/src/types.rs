//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is both the request body and the stored record. The service only
//! performs whole-record overwrites, so there are no separate create/update
//! payloads. Absent JSON fields fall back to their zero value, which is how an
//! unset `id` arrives as the `0` sentinel.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A single todo item, as stored and as sent over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub content: String,
    /// Display hint supplied by the client. Not validated.
    pub order: i32,
    pub done: bool,
}

impl Todo {
    /// An open todo without an id; the store assigns one on write.
    pub fn new(content: impl Into<String>, order: i32) -> Self {
        Self {
            content: content.into(),
            order,
            ..Self::default()
        }
    }
}

impl Entity for Todo {
    const COLLECTION: &'static str = "Todo";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
