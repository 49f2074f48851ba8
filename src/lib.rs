pub mod bootstrap;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod password;
pub mod response;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod store;
pub mod token;
pub mod worker;
