//! Trait seams for external collaborators.

pub mod ledger;
