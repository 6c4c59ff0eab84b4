//! NeuroLift client library
//!
//! Local-first storage for workouts, journal entries and templates, plus the
//! sync engine that mirrors them to a remote document store.

pub mod config;
pub mod db;
pub mod error;
pub mod remote;
pub mod repositories;
pub mod services;
pub mod state;
