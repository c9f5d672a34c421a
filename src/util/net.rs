//! Network helpers for advertising the controller endpoint

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort discovery of the LAN address other devices can reach us on.
///
/// Connecting a UDP socket sends no packets; it only asks the OS which local
/// interface would route to the probe address.
pub fn local_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(("10.254.254.254", 1))?;
        Ok(socket.local_addr()?.ip())
    };

    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Connection string shown to the player for pairing a controller (`ip:port`)
pub fn pairing_string(ip: IpAddr, port: u16) -> String {
    format!("{}:{}", ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_string_joins_ip_and_port() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 6, 218));
        assert_eq!(pairing_string(ip, 10042), "192.168.6.218:10042");
    }

    #[test]
    fn local_ip_never_unspecified() {
        assert!(!local_ip().is_unspecified());
    }
}
