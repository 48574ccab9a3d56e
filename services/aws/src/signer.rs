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

use crate::{sign_v2, sign_v4, Credential};
use cloudsig_core::time::{now, DateTime};
use cloudsig_core::{Error, RequestDescriptor, Result, SigningResult};

/// The signature scheme to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVersion {
    /// Legacy query-string signing.
    V2,
    /// Header-based signing.
    V4,
}

/// Request signer for AWS-style services.
///
/// Selects V2 or V4 from its configuration and exposes a single
/// [`Signer::sign`] contract to the connection layer. Holds no mutable
/// state: region, service and version are fixed at construction, credentials
/// and requests arrive fresh per call, so one instance can serve many
/// threads without synchronization.
#[derive(Debug)]
pub struct Signer {
    service: String,
    region: String,
    version: SignatureVersion,
    api_version: Option<String>,

    time: Option<DateTime>,
}

impl Signer {
    /// Create a new signer for the given service, region and signature
    /// version.
    ///
    /// V4 binds signatures to a region and service, so both must be
    /// non-empty when V4 is selected; this is checked here, never per call.
    pub fn new(service: &str, region: &str, version: SignatureVersion) -> Result<Self> {
        if version == SignatureVersion::V4 && (service.is_empty() || region.is_empty()) {
            return Err(Error::config_invalid(
                "signature v4 requires a service name and a region",
            ));
        }

        Ok(Self {
            service: service.to_string(),
            region: region.to_string(),
            version,
            api_version: None,
            time: None,
        })
    }

    /// Set the API version sent as the `Version` query parameter by V2.
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = Some(api_version.to_string());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request, producing material for the configured scheme.
    ///
    /// Pure apart from the clock reading: two calls with the same inputs and
    /// timestamp yield identical output.
    pub fn sign(&self, req: &RequestDescriptor, cred: &Credential) -> Result<SigningResult> {
        let now = self.time.unwrap_or_else(now);

        match self.version {
            SignatureVersion::V2 => sign_v2::sign(req, cred, self.api_version.as_deref(), now),
            SignatureVersion::V4 => sign_v4::sign(req, cred, &self.service, &self.region, now),
        }
    }
}
