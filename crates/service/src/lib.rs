//! Service layer for teams, drivers and lap times.
//! - Every operation takes the connection explicitly; nothing is cached between calls.
//! - Entities are mapped to flat transfer records; parent names are joined in, never held as object links.
//! - Field rules live in `models`; this layer adds existence checks and not-found signalling.

pub mod errors;
pub mod dto;
pub mod team_service;
pub mod driver_service;
pub mod lap_time_service;
#[cfg(test)]
pub mod test_support;
