//! SocketCAN bus transport
//!
//! Thin frame-oriented wrapper over a raw `socketcan` socket: open a named
//! interface, send, receive with a bounded timeout, and install identifier
//! filters. Open errors are startup-fatal at the caller; there is no retry
//! or reconnect logic at this layer.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use socketcan::{
    CanFilter, CanFrame, CanSocket, EmbeddedFrame, Id, Socket, SocketOptions, StandardId,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::frame::{Frame, MAX_STANDARD_ID};

/// `ENODEV`: the interface name resolved but the device is not there.
const NO_SUCH_DEVICE: i32 = 19;

/// `ENOBUFS`: the socket transmit queue is full.
const NO_BUFFER_SPACE: i32 = 105;

/// Poll interval while waiting for an inbound frame.
const RECV_POLL: Duration = Duration::from_millis(1);

/// Transport-layer errors.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("no such CAN interface '{0}'")]
    NoSuchInterface(String),

    #[error("permission denied opening CAN interface '{0}'")]
    PermissionDenied(String),

    #[error("CAN interface '{interface}' unavailable: {source}")]
    DeviceUnavailable {
        interface: String,
        source: io::Error,
    },

    #[error("transmit queue full")]
    TransmitQueueFull,

    #[error("CAN device gone: {0}")]
    DeviceGone(io::Error),

    #[error("frame rejected by CAN layer: {0}")]
    InvalidFrame(String),
}

/// A frame-oriented, connectionless channel bound to one CAN interface.
pub struct CanBus {
    socket: CanSocket,
    interface: String,
}

impl CanBus {
    /// Open and bind a raw CAN socket on the named interface.
    pub fn open(interface: &str) -> Result<Self, BusError> {
        let socket =
            CanSocket::open(interface).map_err(|e| classify_open_error(interface, e))?;

        socket.set_nonblocking(true).map_err(|e| {
            BusError::DeviceUnavailable {
                interface: interface.to_string(),
                source: e,
            }
        })?;

        debug!(interface = %interface, "CAN socket bound");
        Ok(Self {
            socket,
            interface: interface.to_string(),
        })
    }

    /// The interface this bus is bound to.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Send one frame. Does not block; a full transmit queue is reported,
    /// not waited out.
    pub fn send(&self, frame: &Frame) -> Result<(), BusError> {
        let id = StandardId::new(frame.id()).ok_or_else(|| {
            BusError::InvalidFrame(format!("ID 0x{:X} exceeds 11-bit range", frame.id()))
        })?;
        let can_frame = CanFrame::new(id, frame.data()).ok_or_else(|| {
            BusError::InvalidFrame(format!("{} payload bytes", frame.data().len()))
        })?;

        self.socket
            .write_frame(&can_frame)
            .map_err(classify_send_error)?;

        trace!(id = format!("0x{:03X}", frame.id()), dlc = frame.dlc(), "Frame sent");
        Ok(())
    }

    /// Wait up to `timeout` for one frame.
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing to read.
    /// Interrupted reads are retried silently; remote frames, error frames
    /// and extended-identifier traffic are skipped. Inbound identifiers are
    /// standard 11-bit by construction (masked to `MAX_STANDARD_ID`), and
    /// each returned frame carries its receive timestamp.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Frame>, BusError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.socket.read_frame() {
                Ok(CanFrame::Data(inbound)) => {
                    let raw_id = match inbound.id() {
                        Id::Standard(id) => id.as_raw() & MAX_STANDARD_ID,
                        // 29-bit traffic is outside this network's contract
                        Id::Extended(_) => {
                            if Instant::now() >= deadline {
                                return Ok(None);
                            }
                            continue;
                        }
                    };
                    let frame =
                        Frame::from_parts(raw_id, inbound.data()).with_timestamp(Instant::now());
                    return Ok(Some(frame));
                }
                // Remote and error frames carry no payload for us
                Ok(_) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(RECV_POLL);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                    // Transient; retry immediately
                    continue;
                }
                Err(e) => return Err(BusError::DeviceGone(e)),
            }
        }
    }

    /// Restrict which identifiers `recv_timeout` will surface.
    ///
    /// Each `(id, mask)` pair admits frames where `frame_id & mask ==
    /// id & mask`. Purely an inbound filter; sending is unaffected.
    pub fn set_filters(&self, filters: &[(u16, u16)]) -> Result<(), BusError> {
        let filters: Vec<CanFilter> = filters
            .iter()
            .map(|&(id, mask)| CanFilter::new(id as u32, mask as u32))
            .collect();

        self.socket
            .set_filters(&filters)
            .map_err(|e| BusError::DeviceUnavailable {
                interface: self.interface.clone(),
                source: e,
            })
    }
}

fn classify_open_error(interface: &str, err: io::Error) -> BusError {
    if err.raw_os_error() == Some(NO_SUCH_DEVICE) {
        return BusError::NoSuchInterface(interface.to_string());
    }
    match err.kind() {
        io::ErrorKind::NotFound => BusError::NoSuchInterface(interface.to_string()),
        io::ErrorKind::PermissionDenied => BusError::PermissionDenied(interface.to_string()),
        _ => BusError::DeviceUnavailable {
            interface: interface.to_string(),
            source: err,
        },
    }
}

fn classify_send_error(err: io::Error) -> BusError {
    if err.raw_os_error() == Some(NO_BUFFER_SPACE) || err.kind() == io::ErrorKind::WouldBlock {
        BusError::TransmitQueueFull
    } else {
        BusError::DeviceGone(err)
    }
}
