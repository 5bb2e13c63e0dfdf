use std::{
    net::TcpStream,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::SessionConfig;

use super::{
    Connection, Dispatcher, Event, ProtocolTransport, Request, TransportError,
    error::ProtocolError,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("timed out waiting for {pending} outstanding replies")]
    DrainTimeout { pending: usize },
}

/// A client session: one connection plus the protocol state built up over it.
pub struct Session<T: Connection> {
    transport: ProtocolTransport<T>,
    dispatcher: Dispatcher,
    config: SessionConfig,
}

impl Session<TcpStream> {
    pub fn connect(config: SessionConfig) -> Result<Self, SessionError> {
        info!("connecting to {}", config.address);
        let stream = TcpStream::connect(config.address).map_err(TransportError::from)?;
        stream.set_nodelay(true).map_err(TransportError::from)?;
        Ok(Self::new(stream, config))
    }
}

impl<T: Connection> Session<T> {
    pub fn new(stream: T, config: SessionConfig) -> Self {
        let transport =
            ProtocolTransport::with_limits(stream, config.chunk_size, config.max_frame_len);
        Self {
            transport,
            dispatcher: Dispatcher::new(&config),
            config,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn transport(&self) -> &ProtocolTransport<T> {
        &self.transport
    }

    /// Queues `request` and sends everything queued so far. Returns the request's serial.
    pub fn submit(&mut self, request: Request) -> Result<u32, SessionError> {
        let serial = self.dispatcher.submit(request)?;
        self.flush()?;
        Ok(serial)
    }

    /// Sends queued requests in submission order.
    pub fn flush(&mut self) -> Result<(), SessionError> {
        while let Some(submitted) = self.dispatcher.next_outgoing() {
            self.transport
                .write_request(submitted.serial, &submitted.request)?;
            self.dispatcher.record_sent(&submitted);
        }
        Ok(())
    }

    /// Brings the radio up and asks for the device identity.
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        info!("initializing radio");
        for request in [
            Request::screen_state(true),
            Request::radio_power(true),
            Request::preferred_network_type(1),
            Request::imei(),
            Request::imeisv(),
            Request::baseband_version(),
            Request::network_selection_mode(),
        ] {
            self.dispatcher.submit(request)?;
        }
        self.flush()
    }

    /// Reads one batch of frames and dispatches each, then sends whatever they caused.
    ///
    /// A frame whose content cannot be decoded ends the batch; the frames after it are
    /// dropped and the session carries on. Any other protocol error ends the session.
    pub fn receive(&mut self) -> Result<Vec<Event>, SessionError> {
        let frames = self.transport.read_frames()?;
        let total = frames.len();
        let mut events = Vec::with_capacity(total);

        for (index, frame) in frames.into_iter().enumerate() {
            match self.dispatcher.dispatch(frame) {
                Ok(event) => events.push(event),
                Err(err) if err.aborts_batch() => {
                    error!(
                        "dropping frame: {err}; discarding {} remaining frames in batch",
                        total - index - 1
                    );
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.flush()?;
        Ok(events)
    }

    /// Waits up to the configured poll interval for inbound data and processes it.
    pub fn poll_once(&mut self) -> Result<Vec<Event>, SessionError> {
        self.flush()?;
        if self.transport.poll(self.config.poll_interval)? {
            self.receive()
        } else {
            Ok(Vec::new())
        }
    }

    /// Processes inbound frames until every sent request has been answered.
    pub fn drain_blocking(&mut self) -> Result<(), SessionError> {
        let deadline = self
            .config
            .drain_timeout
            .map(|timeout| Instant::now() + timeout);

        while !self.dispatcher.pending().is_empty() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                let waiting = self.dispatcher.pending().serials();
                warn!("giving up on replies to {waiting:?}");
                return Err(SessionError::DrainTimeout {
                    pending: waiting.len(),
                });
            }
            debug!(
                "draining, {} replies outstanding",
                self.dispatcher.pending().len()
            );
            self.poll_once()?;
        }
        Ok(())
    }

    /// Processes inbound frames until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), SessionError> {
        while !stop.load(Ordering::Relaxed) {
            self.poll_once()?;
        }
        info!("stop requested");
        Ok(())
    }

    /// Turns the screen off, waits for outstanding replies and closes the connection.
    pub fn shutdown(&mut self) -> Result<(), SessionError> {
        let drained = self
            .submit(Request::screen_state(false))
            .and_then(|_| self.drain_blocking());
        if let Err(err) = &drained {
            warn!("shutdown incomplete: {err}");
        }

        self.transport.shutdown()?;
        info!("session closed");
        drained
    }

    pub fn close(mut self) -> Result<(), SessionError> {
        self.shutdown()
    }
}
