//! Domain model for the project/column/ticket board.
//!
//! # Responsibility
//! - Define the canonical Project, Ticket, and User records.
//! - Keep denormalized cross-references (project ticket set, user project
//!   list) explicit in the data shapes.
//!
//! # Invariants
//! - A project's column list behaves as an ordered set (unique, order kept).
//! - A ticket's watcher set never contains its assignee.

pub mod project;
pub mod ticket;
pub mod user;
