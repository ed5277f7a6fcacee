//! UDP input

use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{info, warn};

/// Largest datagram we expect; 7 TS packets is the usual payload
const MAX_DATAGRAM: usize = 65_536;
/// Requested kernel receive buffer
const RECV_BUFFER: usize = 4 * 1024 * 1024;

/// Blocking UDP socket for stream reception, unicast or multicast.
pub fn create_udp_socket(sock_addr: SocketAddr) -> anyhow::Result<Socket> {
    let ip = match sock_addr.ip() {
        IpAddr::V4(v4) => v4,
        _ => anyhow::bail!("only IPv4 is supported"),
    };

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    if let Err(e) = socket.set_recv_buffer_size(RECV_BUFFER) {
        warn!("Could not enlarge UDP receive buffer: {e}");
    }
    socket.bind(&sock_addr.into())?;

    if ip.is_multicast() {
        socket.join_multicast_v4(&ip, &Ipv4Addr::UNSPECIFIED)?;
        info!("Joined multicast group {ip}");
    }

    socket.set_nonblocking(false)?;
    Ok(socket)
}

/// Presents a datagram stream as a continuous byte stream. Never reaches
/// end of stream: a live source ends when the process does.
pub struct UdpSource {
    sock: UdpSocket,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
}

impl UdpSource {
    pub fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let sock: UdpSocket = create_udp_socket(addr)?.into();
        info!("Listening for UDP on {addr}");
        Ok(Self::from_socket(sock))
    }

    pub fn from_socket(sock: UdpSocket) -> Self {
        Self { sock, buf: vec![0; MAX_DATAGRAM], pos: 0, len: 0 }
    }
}

impl Read for UdpSource {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos == self.len {
            self.len = self.sock.recv(&mut self.buf)?;
            self.pos = 0;
        }
        let n = out.len().min(self.len - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
