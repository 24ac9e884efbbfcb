//! Records produced by detection: regions, tables, metadata blocks and column descriptors.
pub mod column;
pub mod region;
pub mod table;
