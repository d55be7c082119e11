//! Octocrab client construction for PRLint's two authentication modes.
//!
//! Installation calls authenticate with `token <access token>`, token minting
//! with `Bearer <App JWT>`. Both send the machine-man preview media type.

use http::header::{ACCEPT, AUTHORIZATION};
use octocrab::Octocrab;

use crate::auth::{AccessToken, AppJwt};

/// Media type requested on every GitHub call.
pub const PREVIEW_ACCEPT: &str = "application/vnd.github.machine-man-preview+json";

/// A GitHub API client bound to one set of credentials.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,
}

impl OctocrabClient {
    /// Creates a client authenticated as an installation.
    pub fn for_installation(api_base: &str, token: &AccessToken) -> Result<Self, octocrab::Error> {
        Self::with_authorization(api_base, format!("token {}", token.expose()))
    }

    /// Creates a client authenticated as the App itself.
    pub fn for_app(api_base: &str, jwt: &AppJwt) -> Result<Self, octocrab::Error> {
        Self::with_authorization(api_base, format!("Bearer {}", jwt.expose()))
    }

    fn with_authorization(api_base: &str, authorization: String) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder()
            .base_uri(api_base.trim_end_matches('/'))?
            .add_header(ACCEPT, PREVIEW_ACCEPT.to_string())
            .add_header(AUTHORIZATION, authorization)
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Accepts one connection, answers 200 with an empty body, and returns
    /// the request head as received.
    fn serve_once() -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (base, handle)
    }

    fn header_values<'a>(head: &'a str, name: &str) -> Vec<&'a str> {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
            .collect()
    }

    #[tokio::test]
    async fn installation_requests_carry_one_of_each_header() {
        let (base, server) = serve_once();
        let client = OctocrabClient::for_installation(&base, &AccessToken::new("ghs_test")).unwrap();

        let response = client.inner()._get(format!("{base}/rate_limit")).await.unwrap();
        assert!(response.status().is_success());

        let head = server.join().unwrap();
        assert_eq!(header_values(&head, "authorization"), vec!["token ghs_test"]);
        assert!(header_values(&head, "accept").contains(&PREVIEW_ACCEPT));
        assert_eq!(header_values(&head, "user-agent").len(), 1);
    }
}
