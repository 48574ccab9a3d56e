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

//! Signature V2, the legacy query-string scheme.
//!
//! The signature covers the full parameter list, including the parameters
//! this signer injects, so injection happens before the string to sign is
//! built.

use log::debug;
use std::fmt::Write;

use crate::canonical::canonical_query_string;
use crate::constants::{V2_SIGNATURE_METHOD, V2_SIGNATURE_VERSION};
use crate::Credential;
use cloudsig_core::hash::base64_hmac_sha256;
use cloudsig_core::time::{format_rfc3339, DateTime};
use cloudsig_core::{RequestDescriptor, Result, SigningResult};

/// Sign a request with Signature V2.
///
/// Returns the complete set of query parameters the caller must merge into
/// the outgoing query string: the original parameters, the injected defaults
/// (`AWSAccessKeyId`, `SignatureVersion`, `SignatureMethod`, `Timestamp`,
/// optionally `Version`) and the final `Signature`.
pub(crate) fn sign(
    req: &RequestDescriptor,
    cred: &Credential,
    api_version: Option<&str>,
    now: DateTime,
) -> Result<SigningResult> {
    let mut params = req.query.clone();
    params.push(("AWSAccessKeyId".to_string(), cred.access_key_id.clone()));
    params.push((
        "SignatureVersion".to_string(),
        V2_SIGNATURE_VERSION.to_string(),
    ));
    params.push((
        "SignatureMethod".to_string(),
        V2_SIGNATURE_METHOD.to_string(),
    ));
    params.push(("Timestamp".to_string(), format_rfc3339(now)));
    if let Some(version) = api_version {
        params.push(("Version".to_string(), version.to_string()));
    }

    let string_to_sign = string_to_sign(req, &params)?;
    debug!("calculated string to sign: {string_to_sign}");

    let signature = base64_hmac_sha256(
        cred.secret_access_key.as_bytes(),
        string_to_sign.as_bytes(),
    );
    params.push(("Signature".to_string(), signature));

    Ok(SigningResult::QueryParams(params))
}

/// `VERB\nHOST\nPATH\nCANONICAL_QUERY`.
///
/// The host carries a `:port` suffix only for non-default ports; that
/// decision is made by [`RequestDescriptor::authority`] before this string is
/// assembled.
fn string_to_sign(req: &RequestDescriptor, params: &[(String, String)]) -> Result<String> {
    let mut f = String::with_capacity(128);
    writeln!(f, "{}", req.method)?;
    writeln!(f, "{}", req.authority())?;
    writeln!(f, "{}", req.path)?;
    write!(f, "{}", canonical_query_string(params))?;

    Ok(f)
}
