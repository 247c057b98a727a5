//! SeaORM entities for the racing data set plus the field rules shared by
//! every write path.

pub mod errors;
pub mod db;
pub mod team;
pub mod driver;
pub mod lap_time;
pub mod timestamp;

#[cfg(test)]
mod tests;
