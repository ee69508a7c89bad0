pub mod auth;
pub mod catalog;
pub mod halls;
pub mod ledger;
pub mod performances;
pub mod reservations;
pub mod tickets;
pub mod users;
