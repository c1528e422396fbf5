//! Immutable card catalogs: the eight character roles and the district deck.

pub mod districts;
pub mod roles;

pub use districts::{District, DistrictColor};
pub use roles::Role;
