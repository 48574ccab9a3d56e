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

//! Signature V4, the header-based scheme.
//!
//! - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)

use http::{header, HeaderMap, HeaderValue};
use log::debug;
use std::fmt::Write;

use crate::canonical::{canonical_headers, canonical_path, canonical_query_string, payload_hash};
use crate::constants::{AWS4_HMAC_SHA256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::scope::{credential_scope, signing_key};
use crate::Credential;
use cloudsig_core::hash::{hex_hmac_sha256, hex_sha256};
use cloudsig_core::time::{format_date, format_iso8601, DateTime};
use cloudsig_core::{Error, RequestDescriptor, Result, SigningResult};

/// Sign a request with Signature V4.
///
/// Returns the headers the caller must merge into the outgoing request:
/// `authorization` and `x-amz-date`, plus `x-amz-security-token` when the
/// credential carries a session token. Injected headers are part of the
/// signed set; headers the caller already supplied win over injected ones.
pub(crate) fn sign(
    req: &RequestDescriptor,
    cred: &Credential,
    service: &str,
    region: &str,
    now: DateTime,
) -> Result<SigningResult> {
    let headers = headers_to_sign(req, cred, now)?;

    let (header_block, signed_names) = canonical_headers(&headers)?;
    let creq = canonical_request_string(req, &header_block, &signed_names)?;
    debug!("calculated canonical request: {creq}");

    // Scope: "20220313/<region>/<service>/aws4_request"
    let scope = credential_scope(&format_date(now), region, service);
    debug!("calculated scope: {scope}");

    // StringToSign:
    //
    // AWS4-HMAC-SHA256
    // 20220313T072004Z
    // 20220313/<region>/<service>/aws4_request
    // <hashed_canonical_request>
    let string_to_sign = {
        let mut f = String::new();
        writeln!(f, "{AWS4_HMAC_SHA256}")?;
        writeln!(f, "{}", format_iso8601(now))?;
        writeln!(f, "{}", &scope)?;
        write!(f, "{}", hex_sha256(creq.as_bytes()))?;
        f
    };
    debug!("calculated string to sign: {string_to_sign}");

    let key = signing_key(&cred.secret_access_key, now, region, service);
    let signature = hex_hmac_sha256(&key, string_to_sign.as_bytes());

    let mut authorization = HeaderValue::from_str(&format!(
        "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
        cred.access_key_id, scope, signed_names, signature
    ))
    .map_err(|e| Error::encoding("failed to create authorization header").with_source(e))?;
    authorization.set_sensitive(true);

    let mut result = HeaderMap::new();
    result.insert(header::AUTHORIZATION, authorization);
    result.insert(
        X_AMZ_DATE,
        headers[X_AMZ_DATE].clone(),
    );
    if let Some(token) = headers.get(X_AMZ_SECURITY_TOKEN) {
        result.insert(X_AMZ_SECURITY_TOKEN, token.clone());
    }

    Ok(SigningResult::Headers(result))
}

/// Assemble the header set the signature covers.
///
/// Starts from the caller's headers with values normalized, then injects
/// `host`, `x-amz-date` and the security token where absent.
fn headers_to_sign(
    req: &RequestDescriptor,
    cred: &Credential,
    now: DateTime,
) -> Result<HeaderMap> {
    let mut headers = req.headers.clone();
    for (_, value) in headers.iter_mut() {
        RequestDescriptor::header_value_normalize(value)
    }

    if !headers.contains_key(header::HOST) {
        let host = HeaderValue::from_str(&req.authority())
            .map_err(|e| Error::encoding("host is not a valid header value").with_source(e))?;
        headers.insert(header::HOST, host);
    }

    if !headers.contains_key(X_AMZ_DATE) {
        let date = HeaderValue::from_str(&format_iso8601(now))
            .map_err(|e| Error::encoding("failed to create date header").with_source(e))?;
        headers.insert(X_AMZ_DATE, date);
    }

    if let Some(token) = &cred.session_token {
        if !headers.contains_key(X_AMZ_SECURITY_TOKEN) {
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                Error::encoding("security token is not a valid header value").with_source(e)
            })?;
            // Keep token value out of logs.
            value.set_sensitive(true);
            headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    }

    Ok(headers)
}

/// `METHOD\nPATH\nQUERY\nHEADERS\nSIGNED_NAMES\nPAYLOAD_HASH`.
fn canonical_request_string(
    req: &RequestDescriptor,
    header_block: &str,
    signed_names: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", req.method)?;
    writeln!(f, "{}", canonical_path(&req.path)?)?;
    writeln!(f, "{}", canonical_query_string(&req.query))?;
    // The header block already ends each line with `\n`; one more separates
    // it from the signed names.
    f.push_str(header_block);
    writeln!(f)?;
    writeln!(f, "{signed_names}")?;
    write!(f, "{}", payload_hash(&req.method, req.body.as_deref()))?;

    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use http::Method;
    use pretty_assertions::assert_eq;

    fn test_time() -> DateTime {
        Utc.with_ymd_and_hms(2015, 3, 4, 17, 34, 52).unwrap()
    }

    fn test_credential() -> Credential {
        Credential::new("my_key", "my_secret")
    }

    fn authorization_of(result: SigningResult) -> String {
        result
            .into_headers()
            .expect("v4 must produce headers")
            .get(header::AUTHORIZATION)
            .expect("authorization must be present")
            .to_str()
            .unwrap()
            .to_string()
    }

    fn reference_request() -> RequestDescriptor {
        let mut req =
            RequestDescriptor::new(Method::GET, "ec2.eu-west-1.amazonaws.com", "/my_action/");
        req.query_push("Action", "DescribeInstances");
        req.query_push("Version", "2013-10-15");
        req.header_insert("Accept-Encoding", "gzip,deflate").unwrap();
        req.header_insert("User-Agent", "libcloud/0.17.0 (Amazon EC2 (eu-central-1))")
            .unwrap();
        req.header_insert("X-AMZ-Date", "20150304T173452Z").unwrap();
        req
    }

    #[test]
    fn test_reference_authorization_header() {
        let result = sign(
            &reference_request(),
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();

        assert_eq!(
            "AWS4-HMAC-SHA256 \
             Credential=my_key/20150304/my_region/my_service/aws4_request, \
             SignedHeaders=accept-encoding;host;user-agent;x-amz-date, \
             Signature=f9868f8414b3c3f856c7955019cc1691265541f5162b9b772d26044280d39bd3",
            authorization_of(result)
        );
    }

    #[test]
    fn test_header_insertion_order_does_not_matter() {
        let mut reordered =
            RequestDescriptor::new(Method::GET, "ec2.eu-west-1.amazonaws.com", "/my_action/");
        reordered.query_push("Version", "2013-10-15");
        reordered.query_push("Action", "DescribeInstances");
        reordered
            .header_insert("User-Agent", "libcloud/0.17.0 (Amazon EC2 (eu-central-1))")
            .unwrap();
        reordered
            .header_insert("X-AMZ-Date", "20150304T173452Z")
            .unwrap();
        reordered
            .header_insert("Accept-Encoding", "gzip,deflate")
            .unwrap();

        let a = sign(
            &reference_request(),
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();
        let b = sign(
            &reordered,
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();

        assert_eq!(authorization_of(a), authorization_of(b));
    }

    #[test]
    fn test_amz_date_injected_when_absent() {
        let req = RequestDescriptor::new(Method::GET, "ec2.eu-west-1.amazonaws.com", "/");
        let headers = sign(
            &req,
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap()
        .into_headers()
        .unwrap();

        assert_eq!("20150304T173452Z", headers[X_AMZ_DATE].to_str().unwrap());
    }

    #[test]
    fn test_post_without_body_differs_from_empty_body() {
        let mut without = RequestDescriptor::new(Method::POST, "ec2.eu-west-1.amazonaws.com", "/");
        without.query_push("Action", "RunInstances");
        let with_empty = without.clone().with_body("");

        let sign_one = |req: &RequestDescriptor| {
            authorization_of(
                sign(req, &test_credential(), "my_service", "my_region", test_time()).unwrap(),
            )
        };

        assert_eq!(
            "AWS4-HMAC-SHA256 \
             Credential=my_key/20150304/my_region/my_service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=8d979e1f98785cf8d18c84a7fb015bc70d5379e57048c0f975de1ac37d86b202",
            sign_one(&without)
        );
        assert_eq!(
            "AWS4-HMAC-SHA256 \
             Credential=my_key/20150304/my_region/my_service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=82a8e5d73804bee1156fd1f3d8014d4def1089857466f640536ca00c153e55dc",
            sign_one(&with_empty)
        );
    }

    #[test]
    fn test_put_with_body_signs_payload() {
        let req = RequestDescriptor::new(
            Method::PUT,
            "storage.my_region.example.com",
            "/my_bucket/my%20key",
        )
        .with_body("Hello,World!");

        let result = sign(
            &req,
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();

        assert_eq!(
            "AWS4-HMAC-SHA256 \
             Credential=my_key/20150304/my_region/my_service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=c91470b60b4c04cf392775fbb73c7a236950a9c1c8ee7c3a901f8324eb342a14",
            authorization_of(result)
        );
    }

    #[test]
    fn test_session_token_is_signed_and_returned() {
        let req = RequestDescriptor::new(Method::GET, "ec2.eu-west-1.amazonaws.com", "/");
        let cred = test_credential().with_session_token("my_token");

        let headers = sign(&req, &cred, "my_service", "my_region", test_time())
            .unwrap()
            .into_headers()
            .unwrap();

        assert_eq!(
            "my_token",
            headers[X_AMZ_SECURITY_TOKEN].to_str().unwrap()
        );
        assert_eq!(
            "AWS4-HMAC-SHA256 \
             Credential=my_key/20150304/my_region/my_service/aws4_request, \
             SignedHeaders=host;x-amz-date;x-amz-security-token, \
             Signature=c72190c9907145823eb930437a5f6053c47b7d51981eca8c7fc1390421ab411b",
            headers[header::AUTHORIZATION].to_str().unwrap()
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign(
            &reference_request(),
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();
        let b = sign(
            &reference_request(),
            &test_credential(),
            "my_service",
            "my_region",
            test_time(),
        )
        .unwrap();

        assert_eq!(authorization_of(a), authorization_of(b));
    }
}
