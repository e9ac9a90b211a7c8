//! HTTP handlers

pub mod health;
pub mod chair;
pub mod posenet;
pub mod history;
pub mod live;
