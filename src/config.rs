//! Session configuration.
//!
//! [`SessionConfig`] collects every tunable of a client session with defaults matching a
//! radio daemon listening on the local loopback. The `rilctl` binary builds one from its
//! command line; library users construct it directly.
use std::{fmt, net::SocketAddr, time::Duration};

pub const DEFAULT_PORT: u16 = 6555;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Peer endpoint.
    pub address: SocketAddr,
    /// Longest wait for readiness before `poll_once` returns empty-handed.
    pub poll_interval: Duration,
    /// Bytes requested from the socket per read.
    pub chunk_size: usize,
    /// Length prefixes above this are treated as a desynchronized stream.
    pub max_frame_len: usize,
    /// Upper bound on the shutdown drain. `None` waits indefinitely.
    pub drain_timeout: Option<Duration>,
    /// Skip even-count padding after strings inside SIM application and data call
    /// records. String lists and single-string replies are always read padded.
    pub aligned_strings: bool,
    pub data_profile: DataProfile,
    pub sim_pin: PinPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            poll_interval: DEFAULT_POLL_INTERVAL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            drain_timeout: Some(DEFAULT_DRAIN_TIMEOUT),
            aligned_strings: false,
            data_profile: DataProfile::default(),
            sim_pin: PinPolicy::default(),
        }
    }
}

/// Parameters of a setup-data-call request. Every field travels as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataProfile {
    /// `"0"` CDMA, `"1"` GSM/UMTS.
    pub radio_technology: String,
    /// `"0"` selects the default profile.
    pub profile: String,
    pub apn: String,
    pub username: String,
    pub password: String,
    /// `"0"` none, `"1"` PAP, `"2"` CHAP, `"3"` PAP or CHAP.
    pub auth_type: String,
    /// PDP type such as `"IP"`, `"IPV6"`, `"IPV4V6"` or `"PPP"`.
    pub pdp_type: String,
}

impl Default for DataProfile {
    fn default() -> Self {
        Self {
            radio_technology: "1".into(),
            profile: "0".into(),
            apn: "internet".into(),
            username: String::new(),
            password: String::new(),
            auth_type: "0".into(),
            pdp_type: "IP".into(),
        }
    }
}

impl DataProfile {
    /// The seven setup parameters in wire order.
    pub fn parameters(&self) -> [&str; 7] {
        [
            self.radio_technology.as_str(),
            self.profile.as_str(),
            self.apn.as_str(),
            self.username.as_str(),
            self.password.as_str(),
            self.auth_type.as_str(),
            self.pdp_type.as_str(),
        ]
    }
}

/// Whether the client answers a "PIN enabled, not verified" SIM with a PIN entry.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum PinPolicy {
    #[default]
    Disabled,
    Enter(String),
}

impl PinPolicy {
    pub fn pin(&self) -> Option<&str> {
        match self {
            PinPolicy::Disabled => None,
            PinPolicy::Enter(pin) => Some(pin),
        }
    }
}

impl fmt::Debug for PinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinPolicy::Disabled => write!(f, "Disabled"),
            PinPolicy::Enter(_) => write!(f, "Enter(<redacted>)"),
        }
    }
}
