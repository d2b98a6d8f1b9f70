//! Wire contracts shared by the ZenCat client modules.
//!
//! Every type here mirrors a JSON shape the backend sends or accepts. Field
//! names follow the wire (snake_case); tolerance for loose backend shapes is
//! kept in `shared` so that call sites never inspect raw JSON.

pub mod domain;
pub mod shared;
pub mod system;
