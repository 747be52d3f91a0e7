//! Core library for cardgrid
//!
//! This crate implements the **Functional Core** of the cardgrid application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The cardgrid project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`cardgrid_core`** (this crate): Pure transformation functions with zero I/O
//! - **`cardgrid`**: HTTP adapters, the async list controller and the CLI (the Imperative Shell)
//!
//! Everything that decides *what* the user sees lives here: how an upstream record
//! becomes an [`item::Item`], how a list is filtered and sorted, how the page cursor
//! moves, and how a list state turns into a [`view::View`]. The shell only decides
//! *when* those functions run.
//!
//! # Module Organization
//!
//! - [`item`]: The `Item` and `SortKey` traits shared by every domain
//! - [`endpoint`]: Request descriptions and the `Endpoint` / `Normalizer` seams
//! - [`envelope`]: Tolerant decoding of flat-array and wrapped-object responses
//! - [`engine`]: The filter/sort engine and page arithmetic
//! - [`state`]: The per-domain list state machine
//! - [`view`]: Cards and views rendered from a list state
//! - [`format`]: Display helpers (currency, percentages, dates, text cleanup)
//! - [`pokemon`], [`recipes`], [`anime`], [`crypto`]: The four domains
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use cardgrid_core::engine::apply;
//! use cardgrid_core::pokemon::{Pokemon, PokemonSort};
//!
//! let items = vec![Pokemon::named(1, "bulbasaur"), Pokemon::named(4, "charmander")];
//! let visible = apply(&items, "char", PokemonSort::Id);
//!
//! assert_eq!(visible.len(), 1);
//! ```

pub mod anime;
pub mod crypto;
pub mod endpoint;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod format;
pub mod item;
pub mod pokemon;
pub mod recipes;
pub mod state;
pub mod view;
