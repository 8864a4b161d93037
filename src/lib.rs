//! Library crate for ranking-live: a live leaderboard fed by a ranking feed,
//! with a countdown that ends in a celebration of the leader.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
