//! rsalloc: hierarchical allocation manager
//!
//! Maintains budget/quota trees where parent totals always reconcile with
//! the sum of their children. Edits either override a single node's value or
//! redistribute a new total proportionally across descendants; four
//! recalculation algorithms (aggregation, distribution, ancestor resync,
//! variance) keep every displayed number consistent.
//!
//! Layered: `domain` (tree model and engines, no I/O), `application`
//! (services over boundary traits), `infrastructure` (real I/O and DI),
//! `cli` (rendering and dispatch).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
