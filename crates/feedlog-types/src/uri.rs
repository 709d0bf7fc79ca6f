//! Feed and snapshot URI grammar.
//!
//! ```text
//! feed://<feedId>[/<percent-encoded-subfeed-name>][?query]
//! sha1://<digest>[/<basename>][?subfeedName=<percent-encoded-name>][&manifest=<digest>]
//! ```
//!
//! Parsing never touches the network; a malformed URI is rejected here with
//! [`TypeError::InvalidUri`] before any request is built.

use std::fmt;

use crate::digest::Sha1Digest;
use crate::error::{TypeError, TypeResult};
use crate::ids::FeedId;

pub const FEED_SCHEME: &str = "feed";
pub const SHA1_SCHEME: &str = "sha1";

/// A parsed live-feed or snapshot URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedUri {
    /// A mutable feed held by the daemon.
    Live {
        feed_id: FeedId,
        subfeed: Option<String>,
    },
    /// An immutable snapshot blob.
    Snapshot {
        digest: Sha1Digest,
        subfeed: Option<String>,
        manifest: Option<Sha1Digest>,
    },
}

impl FeedUri {
    /// Returns `true` if `s` carries a scheme (and should not be treated as
    /// a registry name).
    pub fn has_scheme(s: &str) -> bool {
        s.contains("://")
    }

    pub fn parse(uri: &str) -> TypeResult<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| TypeError::invalid_uri(uri, "missing scheme"))?;
        match scheme {
            FEED_SCHEME => {
                let (feed_id, subfeed) = parse_live(uri, rest)?;
                Ok(Self::Live { feed_id, subfeed })
            }
            SHA1_SCHEME => parse_snapshot(uri, rest),
            other => Err(TypeError::invalid_uri(uri, format!("unsupported scheme {other:?}"))),
        }
    }

    /// The subfeed name carried by this URI, if any.
    pub fn subfeed(&self) -> Option<&str> {
        match self {
            Self::Live { subfeed, .. } | Self::Snapshot { subfeed, .. } => subfeed.as_deref(),
        }
    }

    /// The same URI with any subfeed component removed.
    pub fn feed_only(&self) -> Self {
        match self {
            Self::Live { feed_id, .. } => Self::Live {
                feed_id: feed_id.clone(),
                subfeed: None,
            },
            Self::Snapshot { digest, manifest, .. } => Self::Snapshot {
                digest: *digest,
                subfeed: None,
                manifest: *manifest,
            },
        }
    }

    /// The URI addressing `subfeed_uri_name` within this feed.
    pub fn with_subfeed(&self, subfeed_uri_name: impl Into<String>) -> Self {
        let subfeed = Some(subfeed_uri_name.into());
        match self {
            Self::Live { feed_id, .. } => Self::Live {
                feed_id: feed_id.clone(),
                subfeed,
            },
            Self::Snapshot { digest, manifest, .. } => Self::Snapshot {
                digest: *digest,
                subfeed,
                manifest: *manifest,
            },
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot { .. })
    }
}

impl fmt::Display for FeedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live { feed_id, subfeed } => {
                write!(f, "{FEED_SCHEME}://{feed_id}")?;
                if let Some(name) = subfeed {
                    write!(f, "/{}", quote(name))?;
                }
                Ok(())
            }
            Self::Snapshot {
                digest,
                subfeed,
                manifest,
            } => {
                write!(f, "{SHA1_SCHEME}://{digest}")?;
                let mut sep = '?';
                if let Some(name) = subfeed {
                    write!(f, "{sep}subfeedName={}", quote(name))?;
                    sep = '&';
                }
                if let Some(m) = manifest {
                    write!(f, "{sep}manifest={m}")?;
                }
                Ok(())
            }
        }
    }
}

/// Split a `feed://` URI into its feed id and optional subfeed name.
pub fn parse_feed_uri(uri: &str) -> TypeResult<(FeedId, Option<String>)> {
    match FeedUri::parse(uri)? {
        FeedUri::Live { feed_id, subfeed } => Ok((feed_id, subfeed)),
        FeedUri::Snapshot { .. } => Err(TypeError::invalid_uri(uri, "expected feed:// scheme")),
    }
}

/// `feed://<id>` for a live feed.
pub fn live_feed_uri(feed_id: &FeedId) -> String {
    FeedUri::Live {
        feed_id: feed_id.clone(),
        subfeed: None,
    }
    .to_string()
}

/// `sha1://<digest>` for a stored blob.
pub fn sha1_uri(digest: &Sha1Digest) -> String {
    format!("{SHA1_SCHEME}://{digest}")
}

/// Percent-encode a subfeed name for use in a URI, leaving `/` intact.
pub fn quote(s: &str) -> String {
    urlencoding::encode(s).replace("%2F", "/")
}

/// Decode a percent-encoded URI component.
pub fn unquote(uri: &str, s: &str) -> TypeResult<String> {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .map_err(|e| TypeError::invalid_uri(uri, format!("bad percent-encoding: {e}")))
}

fn parse_live(uri: &str, rest: &str) -> TypeResult<(FeedId, Option<String>)> {
    let path = rest.split('?').next().unwrap_or_default();
    let (id, name) = match path.split_once('/') {
        Some((id, name)) => (id, name),
        None => (path, ""),
    };
    if id.is_empty() {
        return Err(TypeError::invalid_uri(uri, "missing feed id"));
    }
    let feed_id = FeedId::new(id).map_err(|_| TypeError::invalid_uri(uri, "malformed feed id"))?;
    let subfeed = if name.is_empty() {
        None
    } else {
        Some(unquote(uri, name)?)
    };
    Ok((feed_id, subfeed))
}

fn parse_snapshot(uri: &str, rest: &str) -> TypeResult<FeedUri> {
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, q),
        None => (rest, ""),
    };
    let hex = path.split('/').next().unwrap_or_default();
    let digest = Sha1Digest::from_hex(hex)
        .map_err(|e| TypeError::invalid_uri(uri, format!("bad digest: {e}")))?;

    let mut subfeed = None;
    let mut manifest = None;
    for pair in query.split(['?', '&']).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "subfeedName" => subfeed = Some(unquote(uri, value)?),
            "manifest" => {
                manifest = Some(
                    Sha1Digest::from_hex(value)
                        .map_err(|e| TypeError::invalid_uri(uri, format!("bad manifest: {e}")))?,
                )
            }
            _ => {}
        }
    }
    Ok(FeedUri::Snapshot {
        digest,
        subfeed,
        manifest,
    })
}
