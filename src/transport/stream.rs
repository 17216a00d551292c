//! Line and block framing shared by the stream-backed transports.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use super::{clean_response, terminate};
use crate::error::{Result, ScpiError};

const CHUNK_SIZE: usize = 4096;

/// Byte stream whose read timeout can be changed between calls.
pub(crate) trait TimedStream: Read + Write + Send {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl TimedStream for TcpStream {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))
    }
}

#[cfg(feature = "instrument_serial")]
impl TimedStream for Box<dyn serialport::SerialPort> {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        serialport::SerialPort::set_timeout(self.as_mut(), timeout).map_err(io::Error::from)
    }
}

/// An open stream plus the bytes received past the last line terminator.
pub(crate) struct LineChannel<S> {
    stream: S,
    endpoint: String,
    timeout: Duration,
    drain_timeout: Duration,
    pending: Vec<u8>,
    last_command: Option<String>,
}

impl<S: TimedStream> LineChannel<S> {
    pub(crate) fn new(
        stream: S,
        endpoint: String,
        timeout: Duration,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            endpoint,
            timeout,
            drain_timeout,
            pending: Vec::new(),
            last_command: None,
        }
    }

    pub(crate) fn write_command(&mut self, command: &str) -> Result<()> {
        let line = terminate(command);
        self.last_command = Some(command.trim_end().to_string());
        self.stream
            .write_all(line.as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| self.map_io_error(e))?;
        tracing::debug!(endpoint = %self.endpoint, command = %command.trim_end(), "Sent command");
        Ok(())
    }

    pub(crate) fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return Ok(self.finish_line(&line));
            }
            if Instant::now() >= deadline {
                return Err(self.timeout_error());
            }
            match self.fill() {
                Ok(0) if self.pending.is_empty() => {
                    return Err(self.closed_error());
                }
                Ok(0) => {
                    let line = std::mem::take(&mut self.pending);
                    return Ok(self.finish_line(&line));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.map_io_error(e)),
            }
        }
    }

    pub(crate) fn read_exact(&mut self, size: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        while self.pending.len() < size {
            if Instant::now() >= deadline {
                return Err(self.timeout_error());
            }
            match self.fill() {
                Ok(0) => return Err(self.closed_error()),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.map_io_error(e)),
            }
        }
        Ok(self.pending.drain(..size).collect())
    }

    /// Wait for data with the primary timeout, then keep reading until the line is
    /// quiet for the drain timeout. The primary timeout is restored on every path.
    pub(crate) fn drain(&mut self) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            loop {
                match self.fill() {
                    Ok(0) => return Err(self.closed_error()),
                    Ok(_) => break,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(self.map_io_error(e)),
                }
            }
        }

        self.stream
            .set_timeout(self.drain_timeout)
            .map_err(|e| self.map_io_error(e))?;
        let drained = self.drain_until_quiet();
        let restored = self.stream.set_timeout(self.timeout);

        drained?;
        restored.map_err(|e| self.map_io_error(e))?;
        let data = std::mem::take(&mut self.pending);
        tracing::debug!(endpoint = %self.endpoint, bytes = data.len(), "Drained raw response");
        Ok(data)
    }

    fn drain_until_quiet(&mut self) -> Result<()> {
        loop {
            match self.fill() {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(e) if is_timeout(&e) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.map_io_error(e)),
            }
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let n = self.stream.read(&mut chunk)?;
        self.pending.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    fn finish_line(&self, line: &[u8]) -> String {
        let response = clean_response(&String::from_utf8_lossy(line));
        tracing::debug!(endpoint = %self.endpoint, response = %response, "Received response");
        response
    }

    fn timeout_error(&self) -> ScpiError {
        ScpiError::Timeout {
            endpoint: self.endpoint.clone(),
            command: self.last_command.clone(),
            timeout: self.timeout,
        }
    }

    fn closed_error(&self) -> ScpiError {
        ScpiError::Connection {
            endpoint: self.endpoint.clone(),
            command: self.last_command.clone(),
            message: "connection closed by instrument".to_string(),
        }
    }

    fn map_io_error(&self, err: io::Error) -> ScpiError {
        if is_timeout(&err) {
            self.timeout_error()
        } else {
            ScpiError::Connection {
                endpoint: self.endpoint.clone(),
                command: self.last_command.clone(),
                message: err.to_string(),
            }
        }
    }
}

/// Failures after which the stream can no longer be trusted. Timeouts leave the
/// link usable.
pub(crate) fn link_lost(err: &ScpiError) -> bool {
    matches!(err, ScpiError::Connection { .. } | ScpiError::Io(_))
}

pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
