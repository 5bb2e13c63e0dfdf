use std::{
    io::{self, ErrorKind, Read, Write},
    net::{Shutdown, TcpStream},
    time::Duration,
};

use bincode::{
    config::{BigEndian, Configuration, Fixint, LittleEndian},
    decode_from_slice, encode_into_slice, encode_to_vec,
};
use bytes::{Buf, Bytes, BytesMut};
use log::trace;
use thiserror::Error;

use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_LEN};

use super::{Request, RequestHeader};

const LENGTH_PREFIX_SIZE: usize = size_of::<u32>();

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection lost")]
    ConnectionLost,
    #[error("malformed frame length {length} (limit {limit})")]
    MalformedLength { length: usize, limit: usize },
    #[error("failed to encode frame: {0}")]
    Serialize(#[from] bincode::error::EncodeError),
    #[error("failed to decode frame: {0}")]
    Deserialize(#[from] bincode::error::DecodeError),
    #[error("Transport IO Error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => TransportError::ConnectionLost,
            _ => TransportError::Io(e),
        }
    }
}

/// A bidirectional byte stream that can report read readiness.
pub trait Connection: Read + Write {
    /// Waits at most `timeout` for readable data or end of stream.
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connection for TcpStream {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        // A zero read timeout is rejected by the socket layer.
        self.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        let mut byte = [0; 1];
        let ready = match self.peek(&mut byte) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(false),
            Err(e) => Err(e),
        };
        self.set_read_timeout(None)?;
        ready
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Length-prefixed framing over a [`Connection`].
///
/// Inbound bytes accumulate in a receive buffer. A length prefix and its payload may
/// arrive in separate reads; [`ProtocolTransport::read_frames`] keeps reading until no
/// partially received frame remains.
pub struct ProtocolTransport<T: Connection> {
    stream: T,
    frame_config: Configuration<BigEndian, Fixint>,
    header_config: Configuration<LittleEndian, Fixint>,
    buffer: BytesMut,
    expected: Option<usize>,
    chunk_size: usize,
    max_frame_len: usize,
}

impl<T: Connection> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self::with_limits(stream, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_limits(stream: T, chunk_size: usize, max_frame_len: usize) -> Self {
        let frame_config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        let header_config = bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding();
        Self {
            stream,
            frame_config,
            header_config,
            buffer: BytesMut::new(),
            expected: None,
            chunk_size: chunk_size.max(1),
            max_frame_len,
        }
    }

    pub fn stream(&self) -> &T {
        &self.stream
    }

    pub fn poll(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        Ok(self.stream.poll_readable(timeout)?)
    }

    pub fn write_request(&mut self, serial: u32, request: &Request) -> Result<(), TransportError> {
        let header = RequestHeader {
            code: request.code(),
            serial,
        };
        let mut block = encode_to_vec(header, self.header_config)?;
        block.extend_from_slice(request.payload());
        self.write_frame(&block)
    }

    /// Writes the length prefix and `block` as two separate writes.
    pub fn write_frame(&mut self, block: &[u8]) -> Result<(), TransportError> {
        let length = u32::try_from(block.len()).map_err(|_| TransportError::MalformedLength {
            length: block.len(),
            limit: u32::MAX as usize,
        })?;
        trace!("sending frame of {length} bytes: {block:02x?}");

        let mut prefix = [0; LENGTH_PREFIX_SIZE];
        encode_into_slice(length, &mut prefix, self.frame_config)?;
        self.stream.write_all(&prefix)?;
        self.stream.write_all(block)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Reads from the stream and returns every frame completed by it.
    ///
    /// Blocks until at least one read has succeeded and no frame is left half-received.
    pub fn read_frames(&mut self) -> Result<Vec<Bytes>, TransportError> {
        let mut frames = Vec::new();
        if self.buffer.is_empty() {
            self.fill()?;
        }

        loop {
            while let Some(frame) = self.next_frame()? {
                frames.push(frame);
            }
            if self.buffer.is_empty() && self.expected.is_none() {
                return Ok(frames);
            }
            trace!(
                "partial frame: {} bytes buffered, expecting {:?}",
                self.buffer.len(),
                self.expected
            );
            self.fill()?;
        }
    }

    pub fn shutdown(&mut self) -> Result<(), TransportError> {
        Ok(self.stream.shutdown()?)
    }

    fn fill(&mut self) -> Result<usize, TransportError> {
        let start = self.buffer.len();
        self.buffer.resize(start + self.chunk_size, 0);
        let read = loop {
            match self.stream.read(&mut self.buffer[start..]) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.truncate(start);
                    return Err(e.into());
                }
            }
        };
        self.buffer.truncate(start + read);
        if read == 0 {
            return Err(TransportError::ConnectionLost);
        }

        trace!("read {read} bytes");
        Ok(read)
    }

    fn next_frame(&mut self) -> Result<Option<Bytes>, TransportError> {
        let length = match self.expected {
            Some(length) => length,
            None => {
                if self.buffer.len() < LENGTH_PREFIX_SIZE {
                    return Ok(None);
                }
                let (length, _): (u32, usize) =
                    decode_from_slice(&self.buffer[..LENGTH_PREFIX_SIZE], self.frame_config)?;
                let length = length as usize;
                if length > self.max_frame_len {
                    return Err(TransportError::MalformedLength {
                        length,
                        limit: self.max_frame_len,
                    });
                }
                self.buffer.advance(LENGTH_PREFIX_SIZE);
                self.expected = Some(length);
                length
            }
        };

        if self.buffer.len() < length {
            return Ok(None);
        }
        self.expected = None;
        Ok(Some(self.buffer.split_to(length).freeze()))
    }
}
