//! Wire types shared between the scheduler backend and its clients.

pub mod api;
pub mod dates;
pub mod models;
