// Pipeline processing: scoping, lookups, group recovery, and assembly

pub mod association;
pub mod catalog;
pub mod enrich;
pub mod groups;
pub mod index;
pub mod prices;
pub mod scope;
