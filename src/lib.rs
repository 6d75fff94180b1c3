#![warn(missing_docs)]
//! # This projects library
//!
//! This library implements the dispatch and motion-control core of elevator cars: ordered
//! request queues per direction, collective control choosing the next floor, a clock-driven
//! mover, and write-through of every transition to an external state store.
//!
//! ## Overview
//! - **config**: Program parameters and the runtime configuration.
//! - **error**: The error types returned by the core.
//! - **print**: Coloured terminal logging.
//! - **elevator_logic**: Request sets, dispatch policy, the car state machine and the mover.
//! - **snapshot**: Read views of a car and the stored record format.
//! - **store**: The state store collaborator and its implementations.
//! - **sync**: Writing snapshots through to the store.
//! - **manager**: Choosing which car answers a floor call.
//! - **service**: The operations exposed to the transport layer.
//! - **init**: Argument parsing and start-up from stored state.

pub mod config;

pub mod error;

pub mod print;

pub mod elevator_logic;

pub mod snapshot;

pub mod store;

pub mod sync;

pub mod manager;

pub mod service;

pub mod init;
