//! Package metadata and versioning

mod calver;
mod meta;

pub use calver::CalVersion;
pub use meta::{Meta, MetaValue};
