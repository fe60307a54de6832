// The changes suggested by this lint usually make the code more cluttered and less clear:
#![allow(clippy::needless_range_loop)]

pub mod mtd;
pub mod multiworld;
pub mod settings;
pub mod witness;
