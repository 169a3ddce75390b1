#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod catchers;
pub mod commands;
pub mod configuration;
pub mod content_api;
pub mod domain;
pub mod models;
pub mod notifier;
pub mod routes;
pub mod scheduler;
pub mod schema;
pub mod startup;
pub mod store;
pub mod telegram;
pub mod telemetry;
