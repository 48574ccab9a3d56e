// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Core components for signing API requests.
//!
//! This crate provides the provider-agnostic building blocks used by the
//! cloudsig service crates:
//!
//! - [`RequestDescriptor`]: a borrowed, read-only description of the request
//!   to sign (method, authority, path, query, headers, optional body)
//! - [`SigningResult`]: the signature material handed back to the connection
//!   layer, either query parameters or headers to merge into the request
//! - [`Error`]: the error type shared by all signers
//!
//! Utility modules:
//!
//! - [`hash`]: SHA-256 / HMAC-SHA256 helpers with hex and base64 encodings
//! - [`time`]: UTC timestamp formatting at second precision
//! - [`utils`]: general utilities including credential redaction
//!
//! Signing itself is a pure function of its inputs: nothing in this crate
//! holds mutable state between calls, so values can be shared freely across
//! threads.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{RequestDescriptor, SigningResult};
