use bincode::{Decode, Encode};

use crate::{
    catalog::{CodeKind, code},
    config::DataProfile,
    parcel::ParcelBuilder,
};

/// Leading fields of every outgoing frame.
#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub struct RequestHeader {
    pub code: u32,
    pub serial: u32,
}

/// Vendor audio controls. These are never answered by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioControl {
    ForceCommunication,
    SpeakerOnOff,
    MicMuteUnmute,
    ModeNormal,
}

impl AudioControl {
    pub fn code(self) -> u32 {
        match self {
            AudioControl::ForceCommunication => code::AUDIO_FORCE_COMMUNICATION,
            AudioControl::SpeakerOnOff => code::AUDIO_SPEAKER_ON_OFF,
            AudioControl::MicMuteUnmute => code::AUDIO_MIC_MUTE_UNMUTE,
            AudioControl::ModeNormal => code::AUDIO_MODE_NORMAL,
        }
    }
}

/// A command waiting for a serial. The serial is assigned on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    code: u32,
    parcel: ParcelBuilder,
    expects_reply: bool,
}

impl Request {
    pub fn new(code: u32) -> Self {
        Self {
            code,
            parcel: ParcelBuilder::new(),
            expects_reply: CodeKind::of(code) != CodeKind::Audio,
        }
    }

    /// A request the peer never answers; it skips the correlation table.
    pub fn fire_and_forget(code: u32) -> Self {
        Self {
            expects_reply: false,
            ..Self::new(code)
        }
    }

    /// A request carrying a counted list of integers.
    pub fn with_ints(code: u32, values: &[i32]) -> Self {
        let mut request = Self::new(code);
        request.parcel.write_i32(values.len() as i32);
        for value in values {
            request.parcel.write_i32(*value);
        }
        request
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn expects_reply(&self) -> bool {
        self.expects_reply
    }

    pub fn payload(&self) -> &[u8] {
        self.parcel.as_bytes()
    }

    pub fn parcel_mut(&mut self) -> &mut ParcelBuilder {
        &mut self.parcel
    }

    pub fn sim_status() -> Self {
        Self::new(code::GET_SIM_STATUS)
    }

    pub fn enter_sim_pin(pin: &str) -> Self {
        let mut request = Self::new(code::ENTER_SIM_PIN);
        request.parcel.write_string_list(&[pin]);
        request
    }

    pub fn registration_state() -> Self {
        Self::new(code::REGISTRATION_STATE)
    }

    pub fn gprs_registration_state() -> Self {
        Self::new(code::GPRS_REGISTRATION_STATE)
    }

    pub fn operator() -> Self {
        Self::new(code::OPERATOR)
    }

    pub fn data_call_list() -> Self {
        Self::new(code::DATA_CALL_LIST)
    }

    pub fn setup_data_call(profile: &DataProfile) -> Self {
        let mut request = Self::new(code::SETUP_DATA_CALL);
        request.parcel.write_string_list(&profile.parameters());
        request
    }

    pub fn screen_state(on: bool) -> Self {
        Self::with_ints(code::SCREEN_STATE, &[on as i32])
    }

    pub fn radio_power(on: bool) -> Self {
        Self::with_ints(code::RADIO_POWER, &[on as i32])
    }

    pub fn preferred_network_type(network_type: i32) -> Self {
        Self::with_ints(code::SET_PREFERRED_NETWORK_TYPE, &[network_type])
    }

    pub fn imei() -> Self {
        Self::new(code::GET_IMEI)
    }

    pub fn imeisv() -> Self {
        Self::new(code::GET_IMEISV)
    }

    pub fn baseband_version() -> Self {
        Self::new(code::BASEBAND_VERSION)
    }

    pub fn network_selection_mode() -> Self {
        Self::new(code::QUERY_NETWORK_SELECTION_MODE)
    }

    /// Dial `number` with default CLIR and no UUS information.
    pub fn dial(number: &str) -> Self {
        let mut request = Self::new(code::DIAL);
        request.parcel.write_string(number);
        request.parcel.write_i32(0);
        request.parcel.write_i32(0);
        request.parcel.write_i32(0);
        request
    }

    pub fn audio(control: AudioControl) -> Self {
        Self::fire_and_forget(control.code())
    }
}
