//! SocketDestination - sends each message over udp, tcp or a unix datagram socket

use contracts::{ContractError, Destination};
use std::collections::HashMap;
use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
use tracing::{debug, error, instrument};

/// Transport protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketProtocol {
    Udp,
    Tcp,
    #[cfg(unix)]
    Unixgram,
}

impl SocketProtocol {
    /// Parse a protocol name
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            #[cfg(unix)]
            "unixgram" => Ok(Self::Unixgram),
            other => Err(format!("unsupported protocol '{other}'")),
        }
    }
}

/// Configuration for SocketDestination
#[derive(Debug, Clone)]
pub struct SocketDestinationConfig {
    pub protocol: SocketProtocol,
    /// `host:port`, or a socket path for unixgram
    pub endpoint: String,
}

impl SocketDestinationConfig {
    /// Create config from properties map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let protocol = params
            .get("protocol")
            .ok_or_else(|| "missing 'protocol' property".to_string())?;
        let endpoint = params
            .get("endpoint")
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| "missing 'endpoint' property".to_string())?;

        Ok(Self {
            protocol: SocketProtocol::parse(protocol)?,
            endpoint: endpoint.clone(),
        })
    }
}

enum Connection {
    Udp(UdpSocket),
    Tcp(TcpStream),
    #[cfg(unix)]
    Unixgram(UnixDatagram),
}

impl Connection {
    fn open(config: &SocketDestinationConfig) -> io::Result<Self> {
        match config.protocol {
            SocketProtocol::Udp => {
                let socket = UdpSocket::bind("0.0.0.0:0")?;
                socket.connect(&config.endpoint)?;
                Ok(Self::Udp(socket))
            }
            SocketProtocol::Tcp => Ok(Self::Tcp(TcpStream::connect(&config.endpoint)?)),
            #[cfg(unix)]
            SocketProtocol::Unixgram => {
                let socket = UnixDatagram::unbound()?;
                socket.connect(&config.endpoint)?;
                Ok(Self::Unixgram(socket))
            }
        }
    }

    fn send(&mut self, message: &str) -> io::Result<()> {
        match self {
            Self::Udp(socket) => socket.send(message.as_bytes()).map(|_| ()),
            // Stream transport needs a delimiter between messages
            Self::Tcp(stream) => {
                stream.write_all(message.as_bytes())?;
                stream.write_all(b"\n")
            }
            #[cfg(unix)]
            Self::Unixgram(socket) => socket.send(message.as_bytes()).map(|_| ()),
        }
    }
}

/// Destination that ships messages to a socket endpoint
pub struct SocketDestination {
    name: String,
    config: SocketDestinationConfig,
    connection: Option<Connection>,
}

impl SocketDestination {
    /// Connect to the configured endpoint
    #[instrument(
        name = "socket_destination_new",
        skip(name, config),
        fields(endpoint = %config.endpoint)
    )]
    pub fn new(name: impl Into<String>, config: SocketDestinationConfig) -> io::Result<Self> {
        let name = name.into();
        let connection = Connection::open(&config)?;

        debug!(
            destination = %name,
            protocol = ?config.protocol,
            endpoint = %config.endpoint,
            "SocketDestination connected"
        );

        Ok(Self {
            name,
            config,
            connection: Some(connection),
        })
    }

    /// Create from properties (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = SocketDestinationConfig::from_params(params)
            .map_err(|e| ContractError::destination_open(&name, e))?;

        Self::new(name.clone(), config)
            .map_err(|e| ContractError::destination_open(&name, e.to_string()))
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl Destination for SocketDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, message: &str) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        // Best effort, the message is lost
        if let Err(e) = connection.send(message) {
            error!(destination = %self.name, error = %e, "Socket send failed");
        }
    }

    fn close(&mut self) -> Result<(), ContractError> {
        if let Some(Connection::Tcp(stream)) = self.connection.take() {
            match stream.shutdown(Shutdown::Both) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
                Err(e) => return Err(ContractError::destination_close(&self.name, e.to_string())),
            }
        }
        debug!(destination = %self.name, "SocketDestination closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::time::Duration;

    fn params(protocol: &str, endpoint: &str) -> HashMap<String, String> {
        HashMap::from([
            ("protocol".to_string(), protocol.to_string()),
            ("endpoint".to_string(), endpoint.to_string()),
        ])
    }

    #[test]
    fn test_socket_config_parsing() {
        let config =
            SocketDestinationConfig::from_params(&params("UDP", "127.0.0.1:9999")).unwrap();
        assert_eq!(config.protocol, SocketProtocol::Udp);
        assert_eq!(config.endpoint, "127.0.0.1:9999");

        assert!(SocketDestinationConfig::from_params(&params("carrier-pigeon", "x")).is_err());
        assert!(SocketDestinationConfig::from_params(&HashMap::new()).is_err());
    }

    #[test]
    fn test_udp_destination_sends_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let endpoint = receiver.local_addr().unwrap().to_string();

        let mut dest = SocketDestination::from_params("udp", &params("udp", &endpoint)).unwrap();
        dest.write("hello over udp");

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello over udp");

        assert!(dest.close().is_ok());
        assert!(dest.close().is_ok());
    }

    #[test]
    fn test_tcp_destination_writes_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = listener.local_addr().unwrap().to_string();

        let mut dest = SocketDestination::from_params("tcp", &params("tcp", &endpoint)).unwrap();
        let (peer, _) = listener.accept().unwrap();

        dest.write("one");
        dest.write("two");
        dest.close().unwrap();

        let lines: Vec<String> = BufReader::new(peer).lines().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }
}
