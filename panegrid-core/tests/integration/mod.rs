//! Integration test modules

mod layout_scenarios;
mod persistence_roundtrip;
