//! # IO Module
//!
//! The adapter layer between HTTP clients and the domain services.
//!
//! It translates requests into domain commands, formats domain results for
//! the wire, and is the only layer that knows about status codes.
//!
//! ## Supported Operations
//!
//! - **POST/GET /api/books**, **PATCH /api/books/:code**
//! - **POST /api/books/:code/borrow**, **POST /api/books/:code/return**
//! - **POST/GET /api/members**, **PATCH /api/members/:code**

pub mod rest;

pub use rest::*;
