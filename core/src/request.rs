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

use bytes::Bytes;
use http::header::HeaderName;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

use crate::Result;

/// Description of the request to sign.
///
/// The connection layer builds one of these per API call and hands it to a
/// signer together with a credential. The signer only ever reads it; applying
/// the resulting [`SigningResult`] to the outgoing request is the caller's
/// job.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Host name, without port.
    pub host: String,
    /// Port, if it differs from the scheme default.
    pub port: Option<u16>,
    /// Whether the request goes over TLS. Decides the default port.
    pub secure: bool,
    /// Absolute request path, e.g. `/my_action/`.
    pub path: String,
    /// Query parameters in insertion order.
    ///
    /// Canonicalization imposes lexical order later; the original order is
    /// kept here so callers can reason about what they sent. Numeric values
    /// must be stringified by the caller.
    pub query: Vec<(String, String)>,
    /// Request headers. Names are case-insensitive by construction.
    pub headers: HeaderMap,
    /// Request body, if already known at signing time.
    ///
    /// `None` means the payload is not available yet, which is distinct from
    /// `Some(Bytes::new())`, an empty payload. The two sign differently.
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    /// Create a new descriptor for the given method, host and path.
    ///
    /// Defaults: TLS on, no explicit port, empty query, empty headers, no
    /// body.
    pub fn new(method: Method, host: &str, path: &str) -> Self {
        Self {
            method,
            host: host.to_string(),
            port: None,
            secure: true,
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Choose between TLS and plain HTTP.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Attach the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Parse a raw query string and append its pairs in order.
    pub fn query_parse(&mut self, query: &str) {
        self.query.extend(
            form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Insert a header, replacing any previous value under the same name.
    ///
    /// Returns an encoding error if the name or value is not a valid HTTP
    /// header.
    pub fn header_insert(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Authority of this request: `host` with `:port` appended only when the
    /// port differs from the scheme default (443 for TLS, 80 otherwise).
    pub fn authority(&self) -> String {
        let default_port = if self.secure { 443 } else { 80 };
        match self.port {
            Some(p) if p != default_port => format!("{}:{}", self.host, p),
            _ => self.host.clone(),
        }
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }

    /// Normalize header value.
    ///
    /// Only leading and trailing whitespace is trimmed. Interior whitespace
    /// runs are kept as-is: the scheme this signer is compatible with never
    /// collapsed them, so neither do we.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();

        let is_space = |b: &u8| *b == b' ' || *b == b'\t';
        let starting_index = bs.iter().position(|b| !is_space(b)).unwrap_or(0);
        let ending_offset = bs.iter().rev().position(|b| !is_space(b)).unwrap_or(0);
        let ending_index = bs.len() - ending_offset;

        // This can't fail because we started with a valid HeaderValue and then only trimmed spaces
        *v = HeaderValue::from_bytes(&bs[starting_index..ending_index])
            .expect("invalid header value")
    }
}

/// Signature material produced by a signer.
///
/// Consumed immediately by the connection layer: merged into the outgoing
/// request and discarded.
#[derive(Debug)]
pub enum SigningResult {
    /// Parameters to merge into the outgoing query string.
    ///
    /// Used by query-string signing schemes; includes every parameter the
    /// signature covers, with the signature itself last.
    QueryParams(Vec<(String, String)>),
    /// Headers to merge into the outgoing request.
    Headers(HeaderMap),
}

impl SigningResult {
    /// Take the query parameters, if this result carries any.
    pub fn into_query_params(self) -> Option<Vec<(String, String)>> {
        match self {
            SigningResult::QueryParams(v) => Some(v),
            SigningResult::Headers(_) => None,
        }
    }

    /// Take the headers, if this result carries any.
    pub fn into_headers(self) -> Option<HeaderMap> {
        match self {
            SigningResult::QueryParams(_) => None,
            SigningResult::Headers(h) => Some(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_authority_elides_default_ports() {
        let req = RequestDescriptor::new(Method::GET, "example.com", "/");
        assert_eq!("example.com", req.authority());

        let req = RequestDescriptor::new(Method::GET, "example.com", "/").with_port(443);
        assert_eq!("example.com", req.authority());

        let req = RequestDescriptor::new(Method::GET, "example.com", "/")
            .with_secure(false)
            .with_port(80);
        assert_eq!("example.com", req.authority());
    }

    #[test]
    fn test_authority_keeps_nonstandard_ports() {
        let req = RequestDescriptor::new(Method::GET, "example.com", "/").with_port(8080);
        assert_eq!("example.com:8080", req.authority());

        // 443 on an insecure connection is not the default.
        let req = RequestDescriptor::new(Method::GET, "example.com", "/")
            .with_secure(false)
            .with_port(443);
        assert_eq!("example.com:443", req.authority());
    }

    #[test]
    fn test_header_value_normalize_trims_edges_only() {
        let cases = [
            ("gzip,deflate", "gzip,deflate"),
            ("  gzip,deflate  ", "gzip,deflate"),
            ("\ta  b\t", "a  b"),
            ("a   b", "a   b"),
        ];

        for (input, expected) in cases {
            let mut v = HeaderValue::from_str(input).unwrap();
            RequestDescriptor::header_value_normalize(&mut v);
            assert_eq!(expected, v.to_str().unwrap(), "failed on input: {input:?}");
        }
    }

    #[test]
    fn test_query_parse_keeps_order() {
        let mut req = RequestDescriptor::new(Method::GET, "example.com", "/");
        req.query_parse("b=2&a=1&a=3");
        assert_eq!(
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
                ("a".to_string(), "3".to_string()),
            ],
            req.query
        );
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let req = RequestDescriptor::new(Method::GET, "example.com", "");
        assert_eq!("/", req.path);
    }
}
