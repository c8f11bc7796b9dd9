//! Redis key layout.
//!
//! One namespace per entity type:
//!
//! | Key | Type | Holds |
//! |-----|------|-------|
//! | `urn:{collection}:{id}` | string | JSON record (collection lower-cased) |
//! | `ids:{Collection}` | set | ids of every stored record |
//! | `seq:{Collection}` | string | sequence counter, advanced with `INCR` |

pub fn record(collection: &str, id: i64) -> String {
    format!("urn:{}:{id}", collection.to_lowercase())
}

pub fn ids(collection: &str) -> String {
    format!("ids:{collection}")
}

pub fn sequence(collection: &str) -> String {
    format!("seq:{collection}")
}
