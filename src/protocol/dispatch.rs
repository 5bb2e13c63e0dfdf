use std::collections::{HashMap, VecDeque};

use log::{debug, info, trace, warn};

use bytes::Bytes;

use crate::{
    catalog::Catalog,
    config::{DataProfile, PinPolicy, SessionConfig},
    parcel::{Parcel, StringLayout},
};

use super::{
    DataCall, Event, PendingRequests, PinState, RadioState, ReplyHeader, Request, SimStatus,
    error::ProtocolError,
    response::{read_count, read_strings},
};

/// Per-code behavior. Every handled code is listed in [`HANDLERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Operator,
    Registration,
    PacketRegistration,
    Identity,
    RadioStateChanged,
    NetworkStateChanged,
    SimStatus,
    DataCallList,
    SetupDataCall,
    NewSms,
}

const HANDLERS: &[(&str, Handler)] = &[
    ("RIL_REQUEST_OPERATOR", Handler::Operator),
    ("RIL_REQUEST_REGISTRATION_STATE", Handler::Registration),
    (
        "RIL_REQUEST_GPRS_REGISTRATION_STATE",
        Handler::PacketRegistration,
    ),
    ("RIL_REQUEST_GET_IMEI", Handler::Identity),
    ("RIL_REQUEST_GET_IMEISV", Handler::Identity),
    ("RIL_REQUEST_BASEBAND_VERSION", Handler::Identity),
    (
        "RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED",
        Handler::RadioStateChanged,
    ),
    (
        "RIL_UNSOL_RESPONSE_NETWORK_STATE_CHANGED",
        Handler::NetworkStateChanged,
    ),
    ("RIL_REQUEST_GET_SIM_STATUS", Handler::SimStatus),
    ("RIL_REQUEST_DATA_CALL_LIST", Handler::DataCallList),
    ("RIL_REQUEST_SETUP_DATA_CALL", Handler::SetupDataCall),
    ("RIL_UNSOL_RESPONSE_NEW_SMS", Handler::NewSms),
];

/// Connection-scoped protocol state.
#[derive(Debug)]
pub struct SessionState {
    pending: PendingRequests,
    /// `None` once `u32::MAX` has been handed out.
    next_serial: Option<u32>,
    data_call_in_progress: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            pending: PendingRequests::new(),
            next_serial: Some(1),
            data_call_in_progress: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingRequests {
        &mut self.pending
    }

    /// Hands out the next serial. Serials are never reused, so this fails once the
    /// counter is spent.
    pub fn allocate_serial(&mut self) -> Result<u32, ProtocolError> {
        let serial = self.next_serial.ok_or(ProtocolError::SerialsExhausted)?;
        self.next_serial = serial.checked_add(1);
        Ok(serial)
    }

    #[cfg(test)]
    pub(crate) fn exhaust_serials(&mut self) {
        self.next_serial = None;
    }

    /// The most recently allocated serial, if any.
    pub fn last_serial(&self) -> Option<u32> {
        match self.next_serial {
            Some(next) => next.checked_sub(1).filter(|serial| *serial > 0),
            None => Some(u32::MAX),
        }
    }

    pub fn data_call_in_progress(&self) -> bool {
        self.data_call_in_progress
    }
}

/// A request with its serial, queued for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub serial: u32,
    pub request: Request,
}

/// Decodes inbound frames and decides what each one causes.
///
/// Requests raised by handlers are queued; the owner sends them with
/// [`Dispatcher::next_outgoing`] and registers each with [`Dispatcher::record_sent`].
pub struct Dispatcher {
    catalog: Catalog,
    handlers: HashMap<u32, Handler>,
    state: SessionState,
    outbox: VecDeque<Submitted>,
    /// Layout of strings inside SIM application and data call records.
    record_layout: StringLayout,
    data_profile: DataProfile,
    sim_pin: PinPolicy,
}

impl Dispatcher {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_catalog(Catalog::new(), config)
    }

    pub fn with_catalog(catalog: Catalog, config: &SessionConfig) -> Self {
        let handlers = HANDLERS
            .iter()
            .filter_map(|&(name, handler)| catalog.code(name).map(|code| (code, handler)))
            .collect::<HashMap<u32, Handler>>();

        let record_layout = if config.aligned_strings {
            StringLayout::Aligned
        } else {
            StringLayout::Unpadded
        };

        Self {
            catalog,
            handlers,
            state: SessionState::new(),
            outbox: VecDeque::new(),
            record_layout,
            data_profile: config.data_profile.clone(),
            sim_pin: config.sim_pin.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn pending(&self) -> &PendingRequests {
        self.state.pending()
    }

    pub fn handles(&self, code: u32) -> bool {
        self.handlers.contains_key(&code)
    }

    /// Assigns a serial to `request` and queues it for sending.
    pub fn submit(&mut self, request: Request) -> Result<u32, ProtocolError> {
        let serial = self.state.allocate_serial()?;
        debug!(
            "queued #{serial} {}",
            self.catalog.describe(request.code())
        );
        self.outbox.push_back(Submitted { serial, request });
        Ok(serial)
    }

    pub fn next_outgoing(&mut self) -> Option<Submitted> {
        self.outbox.pop_front()
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Registers a sent request in the correlation table if it expects a reply.
    pub fn record_sent(&mut self, submitted: &Submitted) {
        if !submitted.request.expects_reply() {
            return;
        }
        if !self
            .state
            .pending
            .submit(submitted.serial, submitted.request.code())
        {
            warn!("serial #{} is already pending", submitted.serial);
        }
    }

    /// Refreshes the data call list and, once per session, requests a data call.
    pub fn start_data_connection(&mut self) -> Result<(), ProtocolError> {
        self.submit(Request::data_call_list())?;

        if self.state.data_call_in_progress {
            debug!("data call setup already in progress");
            return Ok(());
        }
        info!("setting up data call on APN {:?}", self.data_profile.apn);
        self.state.data_call_in_progress = true;
        let request = Request::setup_data_call(&self.data_profile);
        self.submit(request)?;
        Ok(())
    }

    /// Interprets one complete frame.
    ///
    /// Errors returned here either leave the frame partially read or, for
    /// [`ProtocolError::SerialsExhausted`], end the session. Unknown serials, codes and
    /// reply kinds are logged and reported as events instead.
    pub fn dispatch(&mut self, frame: Bytes) -> Result<Event, ProtocolError> {
        trace!("frame: {:02x?}", &frame[..]);
        let mut parcel = Parcel::from(frame);

        let header = match ReplyHeader::decode(&mut parcel) {
            Ok(header) => header,
            Err(err) if !err.aborts_batch() => {
                warn!("{err}, dropping frame");
                return Ok(Event::Ignored(err));
            }
            Err(err) => return Err(err),
        };

        let code = match header {
            ReplyHeader::Solicited { serial } => match self.state.pending.resolve(serial) {
                Some(code) => {
                    debug!("reply to #{serial} {}", self.catalog.describe(code));
                    code
                }
                None => {
                    let remaining = parcel.remaining();
                    warn!(
                        "{}, treating {remaining} bytes as a continuation",
                        ProtocolError::UnknownCorrelation(serial)
                    );
                    return Ok(Event::Untracked { serial, remaining });
                }
            },
            ReplyHeader::Unsolicited { code } => {
                debug!("unsolicited {}", self.catalog.describe(code));
                code
            }
        };

        let event = match self.handlers.get(&code).copied() {
            Some(handler) => self.handle(handler, code, &mut parcel)?,
            None if self.catalog.contains(code) => {
                debug!("no handler for {}", self.catalog.describe(code));
                return Ok(Event::Unhandled { code });
            }
            None => {
                let err = ProtocolError::UnrecognizedCommandCode(code);
                warn!("{err}");
                return Ok(Event::Ignored(err));
            }
        };

        if parcel.remaining() > 0 {
            trace!(
                "{} bytes left unread in {}",
                parcel.remaining(),
                self.catalog.describe(code)
            );
        }
        Ok(event)
    }

    fn handle(
        &mut self,
        handler: Handler,
        code: u32,
        parcel: &mut Parcel,
    ) -> Result<Event, ProtocolError> {
        // String lists and single strings in replies are always padded; only the
        // record decoders honor the configured layout.
        let record_layout = self.record_layout;
        let layout = StringLayout::Aligned;

        match handler {
            Handler::Operator => {
                parcel.read_i32()?;
                let names = read_strings(parcel, layout)?;
                info!("operator: {names:?}");
                if !names.is_empty() {
                    self.start_data_connection()?;
                }
                Ok(Event::Operator(names))
            }
            Handler::Registration => {
                parcel.read_i32()?;
                let fields = read_strings(parcel, layout)?;
                info!("registration state: {fields:?}");
                Ok(Event::Registration(fields))
            }
            Handler::PacketRegistration => {
                parcel.read_i32()?;
                let fields = read_strings(parcel, layout)?;
                info!("packet registration state: {fields:?}");
                Ok(Event::PacketRegistration(fields))
            }
            Handler::Identity => {
                parcel.read_i32()?;
                let value = parcel.read_string_as(layout)?;
                info!("{}: {value:?}", self.catalog.describe(code));
                Ok(Event::Identity { code, value })
            }
            Handler::RadioStateChanged => {
                let state = RadioState::try_from(parcel.read_i32()?)?;
                info!("radio state: {state:?}");
                if state == RadioState::SimLockedOrAbsent {
                    self.submit(Request::sim_status())?;
                }
                Ok(Event::RadioState(state))
            }
            Handler::NetworkStateChanged => {
                self.submit(Request::registration_state())?;
                self.submit(Request::gprs_registration_state())?;
                self.submit(Request::operator())?;
                Ok(Event::NetworkStateChanged)
            }
            Handler::SimStatus => {
                let status = SimStatus::decode(parcel, record_layout)?;
                info!(
                    "SIM card {:?}, PIN {:?}, {} applications",
                    status.card_state,
                    status.pin_state,
                    status.applications.len()
                );
                for app in &status.applications {
                    debug!("SIM application: {app:?}");
                }

                if status.pin_state == PinState::EnabledNotVerified {
                    match self.sim_pin.pin().map(Request::enter_sim_pin) {
                        Some(request) => {
                            info!("SIM PIN required, entering configured PIN");
                            self.submit(request)?;
                        }
                        None => info!("SIM PIN required, PIN entry is disabled"),
                    }
                }
                Ok(Event::SimStatus(status))
            }
            Handler::DataCallList => {
                let error = parcel.read_i32()?;
                if error != 0 {
                    warn!("data call list failed with error {error}");
                    return Ok(Event::DataCallList {
                        error,
                        calls: Vec::new(),
                    });
                }

                let count = read_count(parcel, "data call count")?;
                let mut calls = Vec::new();
                for _ in 0..count {
                    let call = DataCall::decode(parcel, record_layout)?;
                    debug!("data call: {call:?}");
                    calls.push(call);
                }
                Ok(Event::DataCallList { error, calls })
            }
            Handler::SetupDataCall => {
                let error = parcel.read_i32()?;
                if error != 0 {
                    warn!("data call setup failed with error {error}");
                    self.state.data_call_in_progress = false;
                    return Ok(Event::SetupDataCall {
                        error,
                        response: Vec::new(),
                    });
                }

                let response = read_strings(parcel, layout)?;
                info!("data call established: {response:?}");
                Ok(Event::SetupDataCall { error, response })
            }
            Handler::NewSms => {
                let text = parcel.read_string_as(layout)?;
                info!("incoming SMS: {text:?}");
                Ok(Event::IncomingSms(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{catalog::code, parcel::ParcelBuilder};

    use super::*;

    fn solicited(serial: u32, body: ParcelBuilder) -> Bytes {
        let mut frame = ParcelBuilder::new();
        frame.write_i32(0);
        frame.write_i32(serial as i32);
        frame.write_raw(body.as_bytes());
        frame.into_bytes()
    }

    fn unsolicited(code: u32, body: ParcelBuilder) -> Bytes {
        let mut frame = ParcelBuilder::new();
        frame.write_i32(1);
        frame.write_i32(code as i32);
        frame.write_raw(body.as_bytes());
        frame.into_bytes()
    }

    fn strings_body(status: i32, values: &[&str]) -> ParcelBuilder {
        let mut body = ParcelBuilder::new();
        body.write_i32(status);
        body.write_string_list(values);
        body
    }

    /// Pops every queued request, marking it sent, and returns `(serial, code)` pairs.
    fn send_all(dispatcher: &mut Dispatcher) -> Vec<(u32, u32)> {
        let mut sent = Vec::new();
        while let Some(out) = dispatcher.next_outgoing() {
            dispatcher.record_sent(&out);
            sent.push((out.serial, out.request.code()));
        }
        sent
    }

    fn codes(sent: &[(u32, u32)]) -> Vec<u32> {
        sent.iter().map(|(_, code)| *code).collect()
    }

    #[test]
    fn every_handler_name_is_in_catalog() {
        let dispatcher = Dispatcher::new(&SessionConfig::default());
        for (name, _) in HANDLERS {
            let code = dispatcher.catalog().code(name).unwrap();
            assert!(dispatcher.handles(code), "{name}");
        }
    }

    #[test]
    fn serials_start_at_one_and_increase() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        assert_eq!(dispatcher.state().last_serial(), None);

        assert_eq!(dispatcher.submit(Request::imei()).unwrap(), 1);
        assert_eq!(dispatcher.submit(Request::imeisv()).unwrap(), 2);
        assert_eq!(dispatcher.state().last_serial(), Some(2));
    }

    #[test]
    fn operator_reply_starts_data_connection() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        for _ in 0..4 {
            dispatcher.submit(Request::screen_state(true)).unwrap();
        }
        let serial = dispatcher.submit(Request::operator()).unwrap();
        assert_eq!(serial, 5);
        send_all(&mut dispatcher);
        for serial in 1..=4 {
            dispatcher.state_mut().pending_mut().resolve(serial);
        }
        assert_eq!(dispatcher.pending().get(5).map(|p| p.code), Some(22));

        let event = dispatcher
            .dispatch(solicited(5, strings_body(0, &["Carrier"])))
            .unwrap();

        assert_eq!(event, Event::Operator(vec![Some("Carrier".into())]));
        assert!(dispatcher.pending().is_empty());

        let sent = send_all(&mut dispatcher);
        assert_eq!(codes(&sent), vec![code::DATA_CALL_LIST, code::SETUP_DATA_CALL]);
        assert!(dispatcher.state().data_call_in_progress());
    }

    #[test]
    fn empty_operator_reply_does_not_start_data_connection() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::operator()).unwrap();
        send_all(&mut dispatcher);

        let event = dispatcher
            .dispatch(solicited(serial, strings_body(0, &[])))
            .unwrap();

        assert_eq!(event, Event::Operator(vec![]));
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn sim_locked_radio_state_queries_sim_status() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        dispatcher.submit(Request::imei()).unwrap();
        dispatcher.submit(Request::imeisv()).unwrap();
        let previous = send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(3);
        let event = dispatcher
            .dispatch(unsolicited(code::UNSOL_RADIO_STATE_CHANGED, body))
            .unwrap();

        assert_eq!(event, Event::RadioState(RadioState::SimLockedOrAbsent));
        let sent = send_all(&mut dispatcher);
        assert_eq!(codes(&sent), vec![code::GET_SIM_STATUS]);
        assert!(previous.iter().all(|(serial, _)| *serial < sent[0].0));
    }

    #[test]
    fn other_radio_states_emit_nothing() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let mut body = ParcelBuilder::new();
        body.write_i32(4);
        let event = dispatcher
            .dispatch(unsolicited(code::UNSOL_RADIO_STATE_CHANGED, body))
            .unwrap();

        assert_eq!(event, Event::RadioState(RadioState::SimReady));
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn network_state_change_queries_in_order() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let event = dispatcher
            .dispatch(unsolicited(code::UNSOL_NETWORK_STATE_CHANGED, ParcelBuilder::new()))
            .unwrap();

        assert_eq!(event, Event::NetworkStateChanged);
        let sent = send_all(&mut dispatcher);
        assert_eq!(
            codes(&sent),
            vec![
                code::REGISTRATION_STATE,
                code::GPRS_REGISTRATION_STATE,
                code::OPERATOR
            ]
        );
        assert_eq!(dispatcher.pending().len(), 3);
    }

    #[test]
    fn data_connection_setup_is_latched() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        dispatcher.start_data_connection().unwrap();
        dispatcher.start_data_connection().unwrap();

        let sent = send_all(&mut dispatcher);
        assert_eq!(
            codes(&sent),
            vec![
                code::DATA_CALL_LIST,
                code::SETUP_DATA_CALL,
                code::DATA_CALL_LIST
            ]
        );
    }

    #[test]
    fn failed_setup_clears_latch() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        dispatcher.start_data_connection().unwrap();
        let sent = send_all(&mut dispatcher);
        let setup_serial = sent[1].0;

        let mut body = ParcelBuilder::new();
        body.write_i32(65);
        let event = dispatcher.dispatch(solicited(setup_serial, body)).unwrap();

        assert_eq!(
            event,
            Event::SetupDataCall {
                error: 65,
                response: vec![]
            }
        );
        assert!(!dispatcher.state().data_call_in_progress());

        dispatcher.start_data_connection().unwrap();
        let sent = send_all(&mut dispatcher);
        assert_eq!(codes(&sent), vec![code::DATA_CALL_LIST, code::SETUP_DATA_CALL]);
    }

    #[test]
    fn successful_setup_echoes_profile() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        dispatcher.start_data_connection().unwrap();
        let sent = send_all(&mut dispatcher);

        let event = dispatcher
            .dispatch(solicited(sent[1].0, strings_body(0, &["1", "rmnet", "10.0.0.17"])))
            .unwrap();

        assert_eq!(
            event,
            Event::SetupDataCall {
                error: 0,
                response: vec![
                    Some("1".into()),
                    Some("rmnet".into()),
                    Some("10.0.0.17".into())
                ]
            }
        );
        assert!(dispatcher.state().data_call_in_progress());
    }

    #[test]
    fn data_call_list_entries() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::data_call_list()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(0);
        body.write_i32(1);
        body.write_i32(1);
        body.write_i32(2);
        body.write_string("PPP");
        body.write_string("wap.net");
        body.write_string("10.0.0.17");
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();

        let Event::DataCallList { error, calls } = event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(error, 0);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].apn.as_deref(), Some("wap.net"));
        assert_eq!(calls[0].address.as_deref(), Some("10.0.0.17"));
    }

    #[test]
    fn failed_data_call_list_stops_decoding() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::data_call_list()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(2);
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();

        assert_eq!(
            event,
            Event::DataCallList {
                error: 2,
                calls: vec![]
            }
        );
    }

    fn sim_status_body(pin_state: i32) -> ParcelBuilder {
        let mut body = ParcelBuilder::new();
        body.write_i32(1);
        body.write_i32(pin_state);
        body.write_i32(0);
        body.write_i32(-1);
        body.write_i32(0);
        body
    }

    #[test]
    fn pin_entry_is_disabled_by_default() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::sim_status()).unwrap();
        send_all(&mut dispatcher);

        let event = dispatcher.dispatch(solicited(serial, sim_status_body(1))).unwrap();

        assert!(matches!(event, Event::SimStatus(_)));
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn configured_pin_is_entered() {
        let config = SessionConfig {
            sim_pin: PinPolicy::Enter("1234".into()),
            ..SessionConfig::default()
        };
        let mut dispatcher = Dispatcher::new(&config);
        let serial = dispatcher.submit(Request::sim_status()).unwrap();
        send_all(&mut dispatcher);

        dispatcher.dispatch(solicited(serial, sim_status_body(1))).unwrap();

        let out = dispatcher.next_outgoing().unwrap();
        assert_eq!(out.request, Request::enter_sim_pin("1234"));
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn verified_pin_is_not_entered_again() {
        let config = SessionConfig {
            sim_pin: PinPolicy::Enter("1234".into()),
            ..SessionConfig::default()
        };
        let mut dispatcher = Dispatcher::new(&config);
        let serial = dispatcher.submit(Request::sim_status()).unwrap();
        send_all(&mut dispatcher);

        dispatcher.dispatch(solicited(serial, sim_status_body(2))).unwrap();

        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn identity_reply() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::imei()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(0);
        body.write_string("356938035643809");
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();

        assert_eq!(
            event,
            Event::Identity {
                code: code::GET_IMEI,
                value: Some("356938035643809".into())
            }
        );
    }

    #[test]
    fn incoming_sms_surfaces_one_string() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let mut body = ParcelBuilder::new();
        body.write_string("07911326040000F0");
        let event = dispatcher
            .dispatch(unsolicited(code::UNSOL_NEW_SMS, body))
            .unwrap();

        assert_eq!(event, Event::IncomingSms(Some("07911326040000F0".into())));
    }

    #[test]
    fn unknown_serial_is_untracked() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let event = dispatcher
            .dispatch(solicited(99, strings_body(0, &["x"])))
            .unwrap();

        assert_eq!(
            event,
            Event::Untracked {
                serial: 99,
                remaining: 16
            }
        );
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn unrecognized_code_is_ignored() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let event = dispatcher.dispatch(unsolicited(4242, ParcelBuilder::new())).unwrap();

        assert_eq!(
            event,
            Event::Ignored(ProtocolError::UnrecognizedCommandCode(4242))
        );
    }

    #[test]
    fn known_code_without_handler() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::screen_state(true)).unwrap();
        send_all(&mut dispatcher);

        let event = dispatcher.dispatch(solicited(serial, ParcelBuilder::new())).unwrap();

        assert_eq!(event, Event::Unhandled { code: code::SCREEN_STATE });
        assert!(dispatcher.pending().is_empty());
    }

    #[test]
    fn unknown_reply_kind_is_ignored() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());

        let mut frame = ParcelBuilder::new();
        frame.write_i32(5);
        frame.write_i32(0);
        let event = dispatcher.dispatch(frame.into_bytes()).unwrap();

        assert_eq!(event, Event::Ignored(ProtocolError::UnknownReplyKind(5)));
    }

    #[test]
    fn truncated_reply_is_an_error() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::operator()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(0);
        body.write_i32(2);
        body.write_string("Carrier");
        let err = dispatcher.dispatch(solicited(serial, body)).unwrap_err();

        assert!(matches!(err, ProtocolError::TruncatedFrame { .. }));
        assert!(!dispatcher.has_outgoing());
    }

    #[test]
    fn short_header_is_truncated() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let err = dispatcher.dispatch(Bytes::from_static(&[0, 0, 0, 0, 1])).unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedFrame { .. }));
    }

    #[test]
    fn registration_strings_skip_padding() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::registration_state()).unwrap();
        send_all(&mut dispatcher);

        let event = dispatcher
            .dispatch(solicited(serial, strings_body(0, &["1", "00C3", "0000A5F1"])))
            .unwrap();

        assert_eq!(
            event,
            Event::Registration(vec![
                Some("1".into()),
                Some("00C3".into()),
                Some("0000A5F1".into())
            ])
        );
    }

    #[test]
    fn even_length_operator_names() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::operator()).unwrap();
        send_all(&mut dispatcher);

        let event = dispatcher
            .dispatch(solicited(
                serial,
                strings_body(0, &["T-Mobile", "T-Mobile", "310260"]),
            ))
            .unwrap();

        assert_eq!(
            event,
            Event::Operator(vec![
                Some("T-Mobile".into()),
                Some("T-Mobile".into()),
                Some("310260".into())
            ])
        );
        let sent = send_all(&mut dispatcher);
        assert_eq!(codes(&sent), vec![code::DATA_CALL_LIST, code::SETUP_DATA_CALL]);
    }

    #[test]
    fn identity_and_sms_of_even_length() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::baseband_version()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(0);
        body.write_string("MPSS.TH.2.0.c1");
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();
        assert_eq!(
            event,
            Event::Identity {
                code: code::BASEBAND_VERSION,
                value: Some("MPSS.TH.2.0.c1".into())
            }
        );

        let mut body = ParcelBuilder::new();
        body.write_string("0791");
        let event = dispatcher
            .dispatch(unsolicited(code::UNSOL_NEW_SMS, body))
            .unwrap();
        assert_eq!(event, Event::IncomingSms(Some("0791".into())));
    }

    /// Content followed by a single terminator unit, as SIM and data call records carry.
    fn write_record_string(body: &mut ParcelBuilder, value: &str) {
        let units = value.encode_utf16().collect::<Vec<u16>>();
        body.write_i32(units.len() as i32);
        for unit in units {
            body.write_raw(&unit.to_le_bytes());
        }
        body.write_raw(&[0, 0]);
    }

    fn sim_application(body: &mut ParcelBuilder, aid: &str, label: &str, pin1: i32) {
        body.write_i32(2);
        body.write_i32(5);
        body.write_i32(0);
        write_record_string(body, aid);
        write_record_string(body, label);
        body.write_i32(0);
        body.write_i32(pin1);
        body.write_i32(0);
    }

    #[test]
    fn sim_status_with_two_applications() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        let serial = dispatcher.submit(Request::sim_status()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        for field in [1, 2, 0, -1, 2] {
            body.write_i32(field);
        }
        sim_application(&mut body, "A0000000871002", "USIM", 2);
        sim_application(&mut body, "A0000000090001", "ISIM", 3);
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();

        let Event::SimStatus(status) = event else {
            panic!("unexpected event {event:?}");
        };
        let apps = &status.applications;
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].aid.as_deref(), Some("A0000000871002"));
        assert_eq!(apps[0].label.as_deref(), Some("USIM"));
        assert_eq!(apps[0].pin1, PinState::EnabledVerified);
        assert_eq!(apps[1].aid.as_deref(), Some("A0000000090001"));
        assert_eq!(apps[1].label.as_deref(), Some("ISIM"));
        assert_eq!(apps[1].pin1, PinState::Disabled);
    }

    #[test]
    fn aligned_records_skip_padding() {
        let config = SessionConfig {
            aligned_strings: true,
            ..SessionConfig::default()
        };
        let mut dispatcher = Dispatcher::new(&config);
        let serial = dispatcher.submit(Request::data_call_list()).unwrap();
        send_all(&mut dispatcher);

        let mut body = ParcelBuilder::new();
        body.write_i32(0);
        body.write_i32(2);
        for (cid, apn) in [(1, "internet"), (2, "ims")] {
            body.write_i32(cid);
            body.write_i32(2);
            body.write_string("IPV6");
            body.write_string(apn);
            body.write_string("10.0.0.17");
        }
        let event = dispatcher.dispatch(solicited(serial, body)).unwrap();

        let Event::DataCallList { calls, .. } = event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].pdp_type.as_deref(), Some("IPV6"));
        assert_eq!(calls[1].cid, 2);
        assert_eq!(calls[1].apn.as_deref(), Some("ims"));
    }

    #[test]
    fn serials_are_never_reused() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        dispatcher.state_mut().next_serial = Some(u32::MAX);

        assert_eq!(dispatcher.submit(Request::imei()).unwrap(), u32::MAX);
        assert_eq!(dispatcher.state().last_serial(), Some(u32::MAX));
        assert_eq!(
            dispatcher.submit(Request::imeisv()),
            Err(ProtocolError::SerialsExhausted)
        );
        assert_eq!(send_all(&mut dispatcher).len(), 1);
    }

    #[test]
    fn exhausted_serials_fail_derived_requests() {
        let mut dispatcher = Dispatcher::new(&SessionConfig::default());
        dispatcher.state_mut().exhaust_serials();

        let err = dispatcher
            .dispatch(unsolicited(
                code::UNSOL_NETWORK_STATE_CHANGED,
                ParcelBuilder::new(),
            ))
            .unwrap_err();

        assert_eq!(err, ProtocolError::SerialsExhausted);
        assert!(!err.aborts_batch());
    }
}
