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

//! Credential scope and signing key derivation for Signature V4.

use crate::constants::AWS4_REQUEST;
use cloudsig_core::hash::hmac_sha256;
use cloudsig_core::time::{format_date, DateTime};

/// Build the credential scope: `{date}/{region}/{service}/aws4_request`.
///
/// The scope binds a signature to a day, region and service so it cannot be
/// replayed outside that context.
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{AWS4_REQUEST}")
}

/// Derive the per-request signing key.
///
/// Chained HMAC-SHA256 where each step's raw output keys the next, starting
/// from `"AWS4" + secret`. Only the final signature is ever hex encoded; all
/// intermediate values stay raw bytes.
pub fn signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_credential_scope() {
        assert_eq!(
            "20150304/my_region/my_service/aws4_request",
            credential_scope("20150304", "my_region", "my_service")
        );
    }

    #[test]
    fn test_signing_key() {
        let t = Utc.with_ymd_and_hms(2015, 3, 4, 17, 34, 52).unwrap();
        let key = signing_key("my_secret", t, "my_region", "my_service");

        assert_eq!(
            "e2e3e07d5c1e8db74e067c9f379c4a26c6b24bce966e1167e3e403d61ff1c71b",
            hex::encode(&key)
        );
    }
}
