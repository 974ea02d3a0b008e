//! Bounded downloads of remote media.
//!
//! Fetch targets come from users, so unless private networks are allowed
//! every address the client connects to must be publicly routable. Literal
//! IP hosts are checked before the request and on each redirect; hostnames
//! are checked as they resolve, which also covers DNS rebinding.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use adstudio_core::site_url::is_http_url;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{redirect, Url};

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// A fully buffered remote file.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the remote server, if any.
    pub content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Only http and https URLs can be fetched")]
    UnsupportedUrl,

    #[error("Refusing to fetch from non-public address {0}")]
    BlockedAddress(String),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Remote server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Remote file exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
}

/// Raised inside the resolver and redirect policy; surfaces as
/// [`FetchError::BlockedAddress`].
#[derive(Debug, thiserror::Error)]
#[error("address {0} is not publicly routable")]
struct NonPublicAddress(String);

/// Remote fetch settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub connect_timeout: Duration,
    /// Whole-request budget, body included.
    pub timeout: Duration,
    /// Skip the public-address checks. Local development only.
    pub allow_private_networks: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            allow_private_networks: false,
        }
    }
}

impl FetchConfig {
    /// Load fetch settings from environment variables.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `FETCH_CONNECT_TIMEOUT_SECS`   | `10`    |
    /// | `FETCH_TIMEOUT_SECS`           | `60`    |
    /// | `FETCH_ALLOW_PRIVATE_NETWORKS` | `false` |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let connect_timeout = std::env::var("FETCH_CONNECT_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("FETCH_CONNECT_TIMEOUT_SECS must be a valid u64"))
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let timeout = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("FETCH_TIMEOUT_SECS must be a valid u64"))
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let allow_private_networks = std::env::var("FETCH_ALLOW_PRIVATE_NETWORKS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            connect_timeout,
            timeout,
            allow_private_networks,
        }
    }
}

/// HTTP client for URL-sourced uploads and proxied downloads.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    allow_private_networks: bool,
}

impl RemoteFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let allow_private = config.allow_private_networks;
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if let Err(blocked) = check_literal_host(attempt.url(), allow_private) {
                attempt.error(blocked)
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(policy);
        if !allow_private {
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }

        let client = builder.build().expect("Failed to build reqwest HTTP client");
        Self {
            client,
            allow_private_networks: allow_private,
        }
    }

    /// Download `url` into memory, refusing anything over `max_bytes`.
    ///
    /// A declared `Content-Length` above the limit fails before the body is
    /// read; otherwise the body is streamed and the download aborts as soon
    /// as the running total passes the limit.
    pub async fn fetch(&self, url: &str, max_bytes: u64) -> Result<RemoteFile, FetchError> {
        if !is_http_url(url) {
            return Err(FetchError::UnsupportedUrl);
        }
        let parsed = Url::parse(url).map_err(|_| FetchError::UnsupportedUrl)?;
        check_literal_host(&parsed, self.allow_private_networks)
            .map_err(|blocked| FetchError::BlockedAddress(blocked.0))?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(classify_request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(FetchError::TooLarge { max_bytes });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify_request_error)? {
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                tracing::warn!(url, max_bytes, "Remote file exceeded size limit mid-stream");
                return Err(FetchError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RemoteFile {
            bytes,
            content_type,
        })
    }
}

/// Whether `ip` is globally routable: not loopback, private, link-local,
/// shared, documentation, benchmarking, multicast or reserved.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => is_public_v6(v6),
        },
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..128).contains(&b))
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b == 18 || b == 19))
        || a >= 240)
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let [first, second, ..] = ip.segments();
    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && second == 0x0db8))
}

fn check_literal_host(url: &Url, allow_private: bool) -> Result<(), NonPublicAddress> {
    if allow_private {
        return Ok(());
    }
    let Some(host) = url.host_str() else {
        return Ok(());
    };
    match host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        Ok(ip) if !is_public_ip(ip) => Err(NonPublicAddress(ip.to_string())),
        _ => Ok(()),
    }
}

fn classify_request_error(err: reqwest::Error) -> FetchError {
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        if let Some(blocked) = inner.downcast_ref::<NonPublicAddress>() {
            return FetchError::BlockedAddress(blocked.0.clone());
        }
        source = inner.source();
    }
    FetchError::Request(err)
}

/// System resolver that drops non-public addresses and fails when none
/// remain.
struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(resolve_public(name.as_str().to_string()))
    }
}

async fn resolve_public(host: String) -> Result<Addrs, Box<dyn std::error::Error + Send + Sync>> {
    let public: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
        .await?
        .filter(|addr| is_public_ip(addr.ip()))
        .collect();
    if public.is_empty() {
        return Err(NonPublicAddress(host).into());
    }
    Ok(Box::new(public.into_iter()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn guarded() -> RemoteFetcher {
        RemoteFetcher::new(&FetchConfig::default())
    }

    #[tokio::test]
    async fn rejects_non_http_schemes_without_network() {
        let fetcher = guarded();
        assert_matches!(
            fetcher.fetch("file:///etc/passwd", 10).await,
            Err(FetchError::UnsupportedUrl)
        );
        assert_matches!(
            fetcher.fetch("not a url", 10).await,
            Err(FetchError::UnsupportedUrl)
        );
    }

    #[tokio::test]
    async fn rejects_literal_private_addresses_without_network() {
        let fetcher = guarded();
        for url in [
            "http://127.0.0.1:9/",
            "http://169.254.169.254/latest/meta-data/",
            "http://10.1.2.3/",
            "http://[::1]/",
            "http://[::ffff:192.168.0.1]/",
            "http://2130706433/",
        ] {
            assert_matches!(
                fetcher.fetch(url, 10).await,
                Err(FetchError::BlockedAddress(_)),
                "{url} should be blocked"
            );
        }
    }

    #[test]
    fn public_ip_classification() {
        let public = ["93.184.216.34", "8.8.8.8", "2606:4700::1111"];
        let private = [
            "127.0.0.1",
            "10.0.0.1",
            "172.16.5.4",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "198.18.0.1",
            "240.0.0.1",
            "255.255.255.255",
            "::1",
            "::",
            "fd00::1",
            "fe80::1",
            "2001:db8::1",
            "::ffff:127.0.0.1",
        ];
        for ip in public {
            assert!(is_public_ip(ip.parse().unwrap()), "{ip} should be public");
        }
        for ip in private {
            assert!(!is_public_ip(ip.parse().unwrap()), "{ip} should not be public");
        }
    }

    #[test]
    fn literal_host_check_ignores_names_and_respects_opt_out() {
        let named = Url::parse("http://cdn.example.com/a.png").unwrap();
        assert!(check_literal_host(&named, false).is_ok());

        let loopback = Url::parse("http://127.0.0.1/a.png").unwrap();
        assert!(check_literal_host(&loopback, false).is_err());
        assert!(check_literal_host(&loopback, true).is_ok());
    }

    #[test]
    fn too_large_display() {
        let err = FetchError::TooLarge { max_bytes: 5 };
        assert_eq!(err.to_string(), "Remote file exceeds 5 bytes");
    }
}
