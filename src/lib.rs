//! PokeAPI catalog and battle simulator.
//!
//! The pure core (mapper, catalog, selection, damage, battle) is usable on
//! its own; the remaining modules wire it into a tui-dispatch store.

pub mod action;
pub mod api;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod damage;
pub mod effect;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod reducer;
pub mod selection;
pub mod sprite;
pub mod sprite_backend;
pub mod state;
pub mod ui;
