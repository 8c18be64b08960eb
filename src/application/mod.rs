//! Application layer
//!
//! Use cases that orchestrate domain logic, one per invoice operation. Each
//! takes a command struct and returns a response DTO.

pub mod invoice;
