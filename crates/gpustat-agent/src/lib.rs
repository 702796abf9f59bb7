pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod probe;
pub mod runner;
pub mod signals;
pub mod sources;
pub mod state;
pub mod web;
