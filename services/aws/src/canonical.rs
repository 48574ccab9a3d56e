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

//! Canonical forms of query strings, paths, headers and payloads.
//!
//! Everything here is byte-exact protocol surface: the server recomputes
//! these strings independently and compares signatures, so ordering and
//! escaping rules admit no flexibility.

use http::HeaderMap;
use http::Method;
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, EMPTY_PAYLOAD_HASH, UNSIGNED_PAYLOAD,
};
use cloudsig_core::hash::hex_sha256;
use cloudsig_core::{Error, Result};

/// Build the canonical query string from a list of parameters.
///
/// Pairs are sorted by raw byte value before encoding, then each key and
/// value is percent-encoded with the AWS unreserved set (space becomes `%20`,
/// never `+`) and joined as `k=v` with `&`. An empty list yields the empty
/// string.
pub fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut pairs = query.to_vec();
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Normalize a request path for the canonical request.
///
/// The path is percent-decoded first so that callers may pass either raw or
/// pre-encoded paths, then re-encoded with the AWS URI set, which keeps `/`.
pub fn canonical_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Ok("/".to_string());
    }

    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|e| Error::encoding("request path is not valid utf-8").with_source(e))?;

    Ok(utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string())
}

/// Build the canonical header block and the signed header names.
///
/// Header names are lower-cased and sorted; values keep interior whitespace
/// runs and only lose leading/trailing spaces and tabs. The block is one
/// `name:value\n` line per header; the second element is the same names
/// joined with `;`.
///
/// Returns an encoding error for header values that are not valid UTF-8.
pub fn canonical_headers(headers: &HeaderMap) -> Result<(String, String)> {
    let mut pairs = headers
        .iter()
        .map(|(name, value)| {
            let value = value
                .to_str()
                .map_err(|e| Error::encoding("header value is not valid utf-8").with_source(e))?;
            Ok((
                name.as_str().to_lowercase(),
                value.trim_matches(|c| c == ' ' || c == '\t').to_string(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    pairs.sort();

    let mut block = String::with_capacity(64);
    for (name, value) in pairs.iter() {
        block.push_str(name);
        block.push(':');
        block.push_str(value);
        block.push('\n');
    }

    let signed_names = pairs
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    Ok((block, signed_names))
}

/// Compute the declared payload hash for a request.
///
/// - body present (even empty): hex SHA-256 of the exact bytes;
/// - body absent on POST/PUT: the `UNSIGNED-PAYLOAD` sentinel, since those
///   calls often attach a streamed body after signing;
/// - body absent otherwise: hash of the empty byte sequence.
///
/// An empty body and a missing body sign differently on POST. Servers check
/// the declared hash against the bytes actually sent, so collapsing the two
/// would break requests silently.
pub fn payload_hash(method: &Method, body: Option<&[u8]>) -> String {
    match body {
        Some(bytes) => hex_sha256(bytes),
        None if matches!(*method, Method::POST | Method::PUT) => UNSIGNED_PAYLOAD.to_string(),
        None => EMPTY_PAYLOAD_HASH.to_string(),
    }
}
