//! Command catalog.
//!
//! Maps the symbolic names of radio interface requests, unsolicited events and vendor
//! audio controls to their numeric wire codes, in both directions. The table is built
//! once and handed to whoever needs it; the dispatcher resolves its handler set through
//! it by name, and log output uses it to print codes symbolically.
//!
//! Codes fall into three ranges:
//!
//! - requests: small positive integers, answered by a solicited reply.
//! - unsolicited events: starting at [`UNSOLICITED_BASE`].
//! - audio controls: starting at [`AUDIO_BASE`], fire-and-forget with no reply.
use std::collections::HashMap;

pub const UNSOLICITED_BASE: u32 = 1000;
pub const AUDIO_BASE: u32 = 2000;

/// Wire codes used directly by the request builders and the dispatcher.
pub mod code {
    pub const GET_SIM_STATUS: u32 = 1;
    pub const ENTER_SIM_PIN: u32 = 2;
    pub const DIAL: u32 = 10;
    pub const REGISTRATION_STATE: u32 = 20;
    pub const GPRS_REGISTRATION_STATE: u32 = 21;
    pub const OPERATOR: u32 = 22;
    pub const RADIO_POWER: u32 = 23;
    pub const SETUP_DATA_CALL: u32 = 27;
    pub const GET_IMEI: u32 = 38;
    pub const GET_IMEISV: u32 = 39;
    pub const QUERY_NETWORK_SELECTION_MODE: u32 = 45;
    pub const BASEBAND_VERSION: u32 = 51;
    pub const DATA_CALL_LIST: u32 = 57;
    pub const SCREEN_STATE: u32 = 61;
    pub const SET_PREFERRED_NETWORK_TYPE: u32 = 73;

    pub const UNSOL_RADIO_STATE_CHANGED: u32 = 1000;
    pub const UNSOL_NETWORK_STATE_CHANGED: u32 = 1002;
    pub const UNSOL_NEW_SMS: u32 = 1003;

    pub const AUDIO_FORCE_COMMUNICATION: u32 = 2000;
    pub const AUDIO_SPEAKER_ON_OFF: u32 = 2001;
    pub const AUDIO_MIC_MUTE_UNMUTE: u32 = 2002;
    pub const AUDIO_MODE_NORMAL: u32 = 2003;
}

/// Which numeric range a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Request,
    Unsolicited,
    Audio,
}

impl CodeKind {
    pub fn of(code: u32) -> Self {
        match code {
            c if c >= AUDIO_BASE => CodeKind::Audio,
            c if c >= UNSOLICITED_BASE => CodeKind::Unsolicited,
            _ => CodeKind::Request,
        }
    }
}

const ENTRIES: &[(&str, u32)] = &[
    ("RIL_REQUEST_GET_SIM_STATUS", code::GET_SIM_STATUS),
    ("RIL_REQUEST_ENTER_SIM_PIN", code::ENTER_SIM_PIN),
    ("RIL_REQUEST_ENTER_SIM_PUK", 3),
    ("RIL_REQUEST_ENTER_SIM_PIN2", 4),
    ("RIL_REQUEST_ENTER_SIM_PUK2", 5),
    ("RIL_REQUEST_CHANGE_SIM_PIN", 6),
    ("RIL_REQUEST_CHANGE_SIM_PIN2", 7),
    ("RIL_REQUEST_ENTER_NETWORK_DEPERSONALIZATION", 8),
    ("RIL_REQUEST_GET_CURRENT_CALLS", 9),
    ("RIL_REQUEST_DIAL", code::DIAL),
    ("RIL_REQUEST_GET_IMSI", 11),
    ("RIL_REQUEST_HANGUP", 12),
    ("RIL_REQUEST_HANGUP_WAITING_OR_BACKGROUND", 13),
    ("RIL_REQUEST_HANGUP_FOREGROUND_RESUME_BACKGROUND", 14),
    ("RIL_REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE", 15),
    ("RIL_REQUEST_SWITCH_HOLDING_AND_ACTIVE", 15),
    ("RIL_REQUEST_CONFERENCE", 16),
    ("RIL_REQUEST_UDUB", 17),
    ("RIL_REQUEST_LAST_CALL_FAIL_CAUSE", 18),
    ("RIL_REQUEST_SIGNAL_STRENGTH", 19),
    ("RIL_REQUEST_REGISTRATION_STATE", code::REGISTRATION_STATE),
    ("RIL_REQUEST_GPRS_REGISTRATION_STATE", code::GPRS_REGISTRATION_STATE),
    ("RIL_REQUEST_OPERATOR", code::OPERATOR),
    ("RIL_REQUEST_RADIO_POWER", code::RADIO_POWER),
    ("RIL_REQUEST_DTMF", 24),
    ("RIL_REQUEST_SEND_SMS", 25),
    ("RIL_REQUEST_SEND_SMS_EXPECT_MORE", 26),
    ("RIL_REQUEST_SETUP_DATA_CALL", code::SETUP_DATA_CALL),
    ("RIL_REQUEST_SIM_IO", 28),
    ("RIL_REQUEST_SEND_USSD", 29),
    ("RIL_REQUEST_CANCEL_USSD", 30),
    ("RIL_REQUEST_GET_CLIR", 31),
    ("RIL_REQUEST_SET_CLIR", 32),
    ("RIL_REQUEST_QUERY_CALL_FORWARD_STATUS", 33),
    ("RIL_REQUEST_SET_CALL_FORWARD", 34),
    ("RIL_REQUEST_QUERY_CALL_WAITING", 35),
    ("RIL_REQUEST_SET_CALL_WAITING", 36),
    ("RIL_REQUEST_SMS_ACKNOWLEDGE", 37),
    ("RIL_REQUEST_GET_IMEI", code::GET_IMEI),
    ("RIL_REQUEST_GET_IMEISV", code::GET_IMEISV),
    ("RIL_REQUEST_ANSWER", 40),
    ("RIL_REQUEST_DEACTIVATE_DATA_CALL", 41),
    ("RIL_REQUEST_QUERY_FACILITY_LOCK", 42),
    ("RIL_REQUEST_SET_FACILITY_LOCK", 43),
    ("RIL_REQUEST_CHANGE_BARRING_PASSWORD", 44),
    (
        "RIL_REQUEST_QUERY_NETWORK_SELECTION_MODE",
        code::QUERY_NETWORK_SELECTION_MODE,
    ),
    ("RIL_REQUEST_SET_NETWORK_SELECTION_AUTOMATIC", 46),
    ("RIL_REQUEST_SET_NETWORK_SELECTION_MANUAL", 47),
    ("RIL_REQUEST_QUERY_AVAILABLE_NETWORKS", 48),
    ("RIL_REQUEST_DTMF_START", 49),
    ("RIL_REQUEST_DTMF_STOP", 50),
    ("RIL_REQUEST_BASEBAND_VERSION", code::BASEBAND_VERSION),
    ("RIL_REQUEST_SEPARATE_CONNECTION", 52),
    ("RIL_REQUEST_SET_MUTE", 53),
    ("RIL_REQUEST_GET_MUTE", 54),
    ("RIL_REQUEST_QUERY_CLIP", 55),
    ("RIL_REQUEST_LAST_DATA_CALL_FAIL_CAUSE", 56),
    ("RIL_REQUEST_DATA_CALL_LIST", code::DATA_CALL_LIST),
    ("RIL_REQUEST_RESET_RADIO", 58),
    ("RIL_REQUEST_OEM_HOOK_RAW", 59),
    ("RIL_REQUEST_OEM_HOOK_STRINGS", 60),
    ("RIL_REQUEST_SCREEN_STATE", code::SCREEN_STATE),
    ("RIL_REQUEST_SET_SUPP_SVC_NOTIFICATION", 62),
    ("RIL_REQUEST_WRITE_SMS_TO_SIM", 63),
    ("RIL_REQUEST_DELETE_SMS_ON_SIM", 64),
    ("RIL_REQUEST_SET_BAND_MODE", 65),
    ("RIL_REQUEST_QUERY_AVAILABLE_BAND_MODE", 66),
    ("RIL_REQUEST_STK_GET_PROFILE", 67),
    ("RIL_REQUEST_STK_SET_PROFILE", 68),
    ("RIL_REQUEST_STK_SEND_ENVELOPE_COMMAND", 69),
    ("RIL_REQUEST_STK_SEND_TERMINAL_RESPONSE", 70),
    ("RIL_REQUEST_STK_HANDLE_CALL_SETUP_REQUESTED_FROM_SIM", 71),
    ("RIL_REQUEST_EXPLICIT_CALL_TRANSFER", 72),
    (
        "RIL_REQUEST_SET_PREFERRED_NETWORK_TYPE",
        code::SET_PREFERRED_NETWORK_TYPE,
    ),
    ("RIL_REQUEST_GET_PREFERRED_NETWORK_TYPE", 74),
    ("RIL_REQUEST_GET_NEIGHBORING_CELL_IDS", 75),
    ("RIL_REQUEST_SET_LOCATION_UPDATES", 76),
    ("RIL_REQUEST_CDMA_SET_SUBSCRIPTION", 77),
    ("RIL_REQUEST_CDMA_SET_ROAMING_PREFERENCE", 78),
    ("RIL_REQUEST_CDMA_QUERY_ROAMING_PREFERENCE", 79),
    ("RIL_REQUEST_SET_TTY_MODE", 80),
    ("RIL_REQUEST_QUERY_TTY_MODE", 81),
    ("RIL_REQUEST_CDMA_SET_PREFERRED_VOICE_PRIVACY_MODE", 82),
    ("RIL_REQUEST_CDMA_QUERY_PREFERRED_VOICE_PRIVACY_MODE", 83),
    ("RIL_REQUEST_CDMA_FLASH", 84),
    ("RIL_REQUEST_CDMA_BURST_DTMF", 85),
    ("RIL_REQUEST_CDMA_VALIDATE_AND_WRITE_AKEY", 86),
    ("RIL_REQUEST_CDMA_SEND_SMS", 87),
    ("RIL_REQUEST_CDMA_SMS_ACKNOWLEDGE", 88),
    ("RIL_REQUEST_GSM_GET_BROADCAST_SMS_CONFIG", 89),
    ("RIL_REQUEST_GSM_SET_BROADCAST_SMS_CONFIG", 90),
    ("RIL_REQUEST_GSM_SMS_BROADCAST_ACTIVATION", 91),
    ("RIL_REQUEST_CDMA_GET_BROADCAST_SMS_CONFIG", 92),
    ("RIL_REQUEST_CDMA_SET_BROADCAST_SMS_CONFIG", 93),
    ("RIL_REQUEST_CDMA_SMS_BROADCAST_ACTIVATION", 94),
    ("RIL_REQUEST_CDMA_SUBSCRIPTION", 95),
    ("RIL_REQUEST_CDMA_WRITE_SMS_TO_RUIM", 96),
    ("RIL_REQUEST_CDMA_DELETE_SMS_ON_RUIM", 97),
    ("RIL_REQUEST_DEVICE_IDENTITY", 98),
    ("RIL_REQUEST_EXIT_EMERGENCY_CALLBACK_MODE", 99),
    ("RIL_REQUEST_GET_SMSC_ADDRESS", 100),
    ("RIL_REQUEST_SET_SMSC_ADDRESS", 101),
    ("RIL_REQUEST_REPORT_SMS_MEMORY_STATUS", 102),
    ("RIL_REQUEST_REPORT_STK_SERVICE_IS_RUNNING", 103),
    (
        "RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED",
        code::UNSOL_RADIO_STATE_CHANGED,
    ),
    ("RIL_UNSOL_RESPONSE_CALL_STATE_CHANGED", 1001),
    (
        "RIL_UNSOL_RESPONSE_NETWORK_STATE_CHANGED",
        code::UNSOL_NETWORK_STATE_CHANGED,
    ),
    ("RIL_UNSOL_RESPONSE_NEW_SMS", code::UNSOL_NEW_SMS),
    ("RIL_UNSOL_RESPONSE_NEW_SMS_STATUS_REPORT", 1004),
    ("RIL_UNSOL_RESPONSE_NEW_SMS_ON_SIM", 1005),
    ("RIL_UNSOL_ON_USSD", 1006),
    ("RIL_UNSOL_ON_USSD_REQUEST", 1007),
    ("RIL_UNSOL_NITZ_TIME_RECEIVED", 1008),
    ("RIL_UNSOL_SIGNAL_STRENGTH", 1009),
    ("RIL_UNSOL_DATA_CALL_LIST_CHANGED", 1010),
    ("RIL_UNSOL_SUPP_SVC_NOTIFICATION", 1011),
    ("RIL_UNSOL_STK_SESSION_END", 1012),
    ("RIL_UNSOL_STK_PROACTIVE_COMMAND", 1013),
    ("RIL_UNSOL_STK_EVENT_NOTIFY", 1014),
    ("RIL_UNSOL_STK_CALL_SETUP", 1015),
    ("RIL_UNSOL_SIM_SMS_STORAGE_FULL", 1016),
    ("RIL_UNSOL_SIM_REFRESH", 1017),
    ("RIL_UNSOL_CALL_RING", 1018),
    ("RIL_UNSOL_RESPONSE_SIM_STATUS_CHANGED", 1019),
    ("RIL_UNSOL_RESPONSE_CDMA_NEW_SMS", 1020),
    ("RIL_UNSOL_RESPONSE_NEW_BROADCAST_SMS", 1021),
    ("RIL_UNSOL_CDMA_RUIM_SMS_STORAGE_FULL", 1022),
    ("RIL_UNSOL_RESTRICTED_STATE_CHANGED", 1023),
    ("RIL_UNSOL_ENTER_EMERGENCY_CALLBACK_MODE", 1024),
    ("RIL_UNSOL_CDMA_CALL_WAITING", 1025),
    ("RIL_UNSOL_CDMA_OTA_PROVISION_STATUS", 1026),
    ("RIL_UNSOL_CDMA_INFO_REC", 1027),
    ("RIL_UNSOL_OEM_HOOK_RAW", 1028),
    ("RIL_UNSOL_RINGBACK_TONE", 1029),
    ("RIL_UNSOL_RESEND_INCALL_MUTE", 1030),
    (
        "AUDIO_REQUEST_FORCE_COMMUNICATION",
        code::AUDIO_FORCE_COMMUNICATION,
    ),
    ("AUDIO_REQUEST_SPEAKER_ON_OFF", code::AUDIO_SPEAKER_ON_OFF),
    ("AUDIO_REQUEST_MIC_MUTE_UNMUTE", code::AUDIO_MIC_MUTE_UNMUTE),
    ("AUDIO_REQUEST_MODE_NORMAL", code::AUDIO_MODE_NORMAL),
];

/// Bidirectional name/code table.
#[derive(Debug, Clone)]
pub struct Catalog {
    codes: HashMap<&'static str, u32>,
    names: HashMap<u32, &'static str>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let mut codes = HashMap::with_capacity(ENTRIES.len());
        let mut names = HashMap::with_capacity(ENTRIES.len());

        for &(name, code) in ENTRIES {
            codes.insert(name, code);
            // Aliased codes keep their first name.
            names.entry(code).or_insert(name);
        }

        Self { codes, names }
    }

    pub fn code(&self, name: &str) -> Option<u32> {
        self.codes.get(name).copied()
    }

    pub fn name(&self, code: u32) -> Option<&'static str> {
        self.names.get(&code).copied()
    }

    pub fn contains(&self, code: u32) -> bool {
        self.names.contains_key(&code)
    }

    /// Symbolic name for logging, or `unknown(<code>)`.
    pub fn describe(&self, code: u32) -> String {
        match self.name(code) {
            Some(name) => name.to_string(),
            None => format!("unknown({code})"),
        }
    }
}
