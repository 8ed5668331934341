//! Loot & progression (§2 component 8, §4.8).

pub mod drops;
pub mod progression;
pub mod vendor;
