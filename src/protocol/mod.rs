//! Radio interface client protocol.
//!
//! This module implements the client side of the radio interface parcel protocol: framing
//! on the socket, correlation of solicited replies with the requests that caused them, and
//! the reactive dispatch of every inbound frame.
//!
//! # Overview
//!
//! The client sends numbered requests and receives two kinds of frames back. A *solicited*
//! reply names the serial of the request it answers; the request's command code is looked
//! up in the [`PendingRequests`] table rather than re-transmitted. An *unsolicited* event
//! carries its own event code. Some frames cause the client to issue follow-up requests,
//! e.g. a radio state change to "SIM locked or absent" triggers a SIM status query.
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: length-prefixed framing over a [`Connection`], reassembling
//!   frames split across reads.
//! - [`Request`]: an outgoing command code plus its parcel payload.
//! - [`Dispatcher`]: decodes each frame, resolves correlation and runs the per-code
//!   handler, queueing derived requests.
//! - [`Session`]: owns a transport and a dispatcher and drives the poll loop.
//!
//! # Binary Format
//!
//! - Every frame starts with a 32-bit big-endian payload length (header excluded).
//! - Request payloads begin with the command code and serial, each 32-bit little-endian.
//! - Reply payloads begin with the reply kind (0 solicited, 1 unsolicited) followed by
//!   the serial or the event code.
//!
//! # See Also
//!
//! - [`parcel`](crate::parcel): field-level encoding inside a frame.
//! - [`catalog`](crate::catalog): the command code table.
mod dispatch;
mod pending;
mod request;
mod response;
mod session;
mod transport;

pub use dispatch::{Dispatcher, SessionState, Submitted};
pub use pending::{PendingRequest, PendingRequests};
pub use request::{AudioControl, Request, RequestHeader};
pub use response::{
    AppState, AppType, CardState, DataCall, DataCallActivity, Event, PinState, RadioState,
    ReplyHeader, SimApplication, SimStatus,
};
pub use session::{Session, SessionError};
pub use transport::{Connection, ProtocolTransport, TransportError};

pub mod error {
    use thiserror::Error;

    use crate::parcel::ParcelError;

    /// Errors raised while interpreting a single frame.
    ///
    /// None of these desynchronize the byte stream: frame boundaries are established by
    /// the transport before any of them can occur.
    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum ProtocolError {
        #[error("truncated frame: needed {needed} bytes, {remaining} remaining")]
        TruncatedFrame { needed: usize, remaining: usize },

        #[error("invalid string length {0}")]
        InvalidLength(i32),

        #[error("string is not valid UTF-16")]
        InvalidText,

        #[error("invalid {field} value {value}")]
        InvalidValue { field: &'static str, value: i32 },

        #[error("no pending request with serial {0}")]
        UnknownCorrelation(u32),

        #[error("unrecognized command code {0}")]
        UnrecognizedCommandCode(u32),

        #[error("unknown reply kind {0}")]
        UnknownReplyKind(i32),

        /// Every serial has been used once. Fatal for the session.
        #[error("request serials exhausted")]
        SerialsExhausted,
    }

    impl ProtocolError {
        /// Whether the rest of the current receive batch must be abandoned.
        ///
        /// Content errors leave the frame half-read; the correlation and code errors are
        /// reported and processing carries on with the next frame. [`SerialsExhausted`]
        /// is neither and ends the session.
        ///
        /// [`SerialsExhausted`]: ProtocolError::SerialsExhausted
        pub fn aborts_batch(&self) -> bool {
            matches!(
                self,
                ProtocolError::TruncatedFrame { .. }
                    | ProtocolError::InvalidLength(_)
                    | ProtocolError::InvalidText
                    | ProtocolError::InvalidValue { .. }
            )
        }
    }

    impl From<ParcelError> for ProtocolError {
        fn from(value: ParcelError) -> Self {
            match value {
                ParcelError::Truncated { needed, remaining } => {
                    ProtocolError::TruncatedFrame { needed, remaining }
                }
                ParcelError::InvalidLength(length) => ProtocolError::InvalidLength(length),
                ParcelError::InvalidText => ProtocolError::InvalidText,
            }
        }
    }

}
