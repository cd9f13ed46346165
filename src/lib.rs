//! This crate provides a client for the admin REST API of a message-queue service: listing queues and their
//! statistics, paging through messages, and managing topics and consumer groups.
//!
//! Backend payloads are normalized into canonical records regardless of envelope shape or field casing, and the
//! message viewer keeps pagination state consistent across refetches.
pub mod client;
pub mod coerce;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod pagination;
pub mod sequence;
pub mod transport;
pub mod viewer;

#[cfg(test)]
mod mock;
