use crate::parcel::{Parcel, StringLayout};

use super::error::ProtocolError;

const REPLY_SOLICITED: i32 = 0;
const REPLY_UNSOLICITED: i32 = 1;

/// Leading fields of every inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyHeader {
    Solicited { serial: u32 },
    Unsolicited { code: u32 },
}

impl ReplyHeader {
    pub fn decode(parcel: &mut Parcel) -> Result<Self, ProtocolError> {
        let kind = parcel.read_i32()?;
        match kind {
            REPLY_SOLICITED => Ok(ReplyHeader::Solicited {
                serial: parcel.read_i32()? as u32,
            }),
            REPLY_UNSOLICITED => Ok(ReplyHeader::Unsolicited {
                code: parcel.read_i32()? as u32,
            }),
            kind => Err(ProtocolError::UnknownReplyKind(kind)),
        }
    }
}

/// What a single dispatched frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Operator(Vec<Option<String>>),
    Registration(Vec<Option<String>>),
    PacketRegistration(Vec<Option<String>>),
    Identity { code: u32, value: Option<String> },
    RadioState(RadioState),
    NetworkStateChanged,
    SimStatus(SimStatus),
    DataCallList { error: i32, calls: Vec<DataCall> },
    SetupDataCall { error: i32, response: Vec<Option<String>> },
    IncomingSms(Option<String>),
    /// A frame with a cataloged code that has no handler.
    Unhandled { code: u32 },
    /// A solicited reply with no pending request, left undecoded.
    Untracked { serial: u32, remaining: usize },
    /// A frame reported and skipped; see [`ProtocolError`].
    Ignored(ProtocolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    Off,
    Unavailable,
    SimNotReady,
    SimLockedOrAbsent,
    SimReady,
    RuimNotReady,
    RuimReady,
    RuimLockedOrAbsent,
    NvNotReady,
    NvReady,
}

impl TryFrom<i32> for RadioState {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(RadioState::Off),
            1 => Ok(RadioState::Unavailable),
            2 => Ok(RadioState::SimNotReady),
            3 => Ok(RadioState::SimLockedOrAbsent),
            4 => Ok(RadioState::SimReady),
            5 => Ok(RadioState::RuimNotReady),
            6 => Ok(RadioState::RuimReady),
            7 => Ok(RadioState::RuimLockedOrAbsent),
            8 => Ok(RadioState::NvNotReady),
            9 => Ok(RadioState::NvReady),
            value => Err(ProtocolError::InvalidValue {
                field: "radio state",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Absent,
    Present,
    Error,
}

impl TryFrom<i32> for CardState {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(CardState::Absent),
            1 => Ok(CardState::Present),
            2 => Ok(CardState::Error),
            value => Err(ProtocolError::InvalidValue {
                field: "card state",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Unknown,
    EnabledNotVerified,
    EnabledVerified,
    Disabled,
    EnabledBlocked,
    EnabledPermBlocked,
}

impl TryFrom<i32> for PinState {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(PinState::Unknown),
            1 => Ok(PinState::EnabledNotVerified),
            2 => Ok(PinState::EnabledVerified),
            3 => Ok(PinState::Disabled),
            4 => Ok(PinState::EnabledBlocked),
            5 => Ok(PinState::EnabledPermBlocked),
            value => Err(ProtocolError::InvalidValue {
                field: "pin state",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppType {
    Unknown,
    Sim,
    Usim,
    Ruim,
    Csim,
}

impl TryFrom<i32> for AppType {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(AppType::Unknown),
            1 => Ok(AppType::Sim),
            2 => Ok(AppType::Usim),
            3 => Ok(AppType::Ruim),
            4 => Ok(AppType::Csim),
            value => Err(ProtocolError::InvalidValue {
                field: "app type",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Unknown,
    Detected,
    Pin,
    Puk,
    SubscriptionPerso,
    Ready,
}

impl TryFrom<i32> for AppState {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(AppState::Unknown),
            1 => Ok(AppState::Detected),
            2 => Ok(AppState::Pin),
            3 => Ok(AppState::Puk),
            4 => Ok(AppState::SubscriptionPerso),
            5 => Ok(AppState::Ready),
            value => Err(ProtocolError::InvalidValue {
                field: "app state",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimStatus {
    pub card_state: CardState,
    pub pin_state: PinState,
    pub gsm_umts_app_index: i32,
    pub cdma_app_index: i32,
    pub applications: Vec<SimApplication>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimApplication {
    pub app_type: AppType,
    pub app_state: AppState,
    /// Only meaningful when `app_state` is [`AppState::SubscriptionPerso`].
    pub perso_substate: i32,
    pub aid: Option<String>,
    pub label: Option<String>,
    pub pin1_replaced: i32,
    pub pin1: PinState,
    pub pin2: PinState,
}

impl SimStatus {
    pub fn decode(parcel: &mut Parcel, layout: StringLayout) -> Result<Self, ProtocolError> {
        let card_state = CardState::try_from(parcel.read_i32()?)?;
        let pin_state = PinState::try_from(parcel.read_i32()?)?;
        let gsm_umts_app_index = parcel.read_i32()?;
        let cdma_app_index = parcel.read_i32()?;
        let count = read_count(parcel, "application count")?;

        let mut applications = Vec::new();
        for _ in 0..count {
            applications.push(SimApplication {
                app_type: AppType::try_from(parcel.read_i32()?)?,
                app_state: AppState::try_from(parcel.read_i32()?)?,
                perso_substate: parcel.read_i32()?,
                aid: parcel.read_string_as(layout)?,
                label: parcel.read_string_as(layout)?,
                pin1_replaced: parcel.read_i32()?,
                pin1: PinState::try_from(parcel.read_i32()?)?,
                pin2: PinState::try_from(parcel.read_i32()?)?,
            });
        }

        Ok(Self {
            card_state,
            pin_state,
            gsm_umts_app_index,
            cdma_app_index,
            applications,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCallActivity {
    Inactive,
    /// Active with the physical link down.
    Dormant,
    /// Active with the physical link up.
    Up,
}

impl TryFrom<i32> for DataCallActivity {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(DataCallActivity::Inactive),
            1 => Ok(DataCallActivity::Dormant),
            2 => Ok(DataCallActivity::Up),
            value => Err(ProtocolError::InvalidValue {
                field: "data call activity",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCall {
    pub cid: i32,
    pub active: DataCallActivity,
    pub pdp_type: Option<String>,
    pub apn: Option<String>,
    pub address: Option<String>,
}

impl DataCall {
    pub fn decode(parcel: &mut Parcel, layout: StringLayout) -> Result<Self, ProtocolError> {
        Ok(Self {
            cid: parcel.read_i32()?,
            active: DataCallActivity::try_from(parcel.read_i32()?)?,
            pdp_type: parcel.read_string_as(layout)?,
            apn: parcel.read_string_as(layout)?,
            address: parcel.read_string_as(layout)?,
        })
    }
}

/// Reads a count followed by that many strings.
pub(crate) fn read_strings(
    parcel: &mut Parcel,
    layout: StringLayout,
) -> Result<Vec<Option<String>>, ProtocolError> {
    let count = read_count(parcel, "string count")?;
    let mut strings = Vec::new();
    for _ in 0..count {
        strings.push(parcel.read_string_as(layout)?);
    }
    Ok(strings)
}

pub(crate) fn read_count(parcel: &mut Parcel, field: &'static str) -> Result<usize, ProtocolError> {
    let value = parcel.read_i32()?;
    usize::try_from(value).map_err(|_| ProtocolError::InvalidValue { field, value })
}
