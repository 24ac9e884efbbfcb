//! # Table Detection
//!
//! Pipeline stages turning a raw grid into one table and its surrounding metadata:
//! row-wrap repair, header location, island segmentation and table merging.
pub mod header;
pub mod island;
pub mod merge;
pub mod wrap;
