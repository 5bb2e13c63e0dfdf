pub mod catalog;
pub mod config;
pub mod parcel;
pub mod protocol;

pub use catalog::Catalog;
pub use config::{DataProfile, PinPolicy, SessionConfig};
pub use parcel::{Parcel, ParcelBuilder, StringLayout};
pub use protocol::{Event, Request, Session, SessionError};
