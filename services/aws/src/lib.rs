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

//! AWS-style request signing.
//!
//! This crate implements the two signature schemes spoken by AWS-compatible
//! APIs:
//!
//! - Signature V2, the legacy query-string scheme
//! - Signature V4, the header-based scheme
//!   ([Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html))
//!
//! The entry point is [`Signer`], which picks the scheme from its
//! configuration and turns a [`RequestDescriptor`] plus a [`Credential`] into
//! a [`SigningResult`] the connection layer merges into the outgoing request.
//! Signing is deterministic: identical inputs, including the timestamp,
//! always produce identical output.

mod constants;

mod credential;
pub use credential::Credential;

pub mod canonical;
pub mod scope;

mod sign_v2;
mod sign_v4;

mod signer;
pub use signer::{SignatureVersion, Signer};

pub use cloudsig_core::{Error, ErrorKind, RequestDescriptor, Result, SigningResult};
