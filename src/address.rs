use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IPAddress {
    V4([u8; 4]),
    V6([u8; 16]),
}

impl Default for IPAddress {
    fn default() -> Self {
        IPAddress::V4([0; 4])
    }
}

impl IPAddress {
    pub fn is_unspecified(&self) -> bool {
        match self {
            IPAddress::V4(bytes) => bytes.iter().all(|b| *b == 0),
            IPAddress::V6(bytes) => bytes.iter().all(|b| *b == 0),
        }
    }

    fn cmp_bytes(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IPAddress::V4(a), IPAddress::V4(b)) => a.cmp(b),
            (IPAddress::V4(_), IPAddress::V6(_)) => Ordering::Less,
            (IPAddress::V6(_), IPAddress::V4(_)) => Ordering::Greater,
            (IPAddress::V6(a), IPAddress::V6(b)) => a.cmp(b),
        }
    }
}

impl Ord for IPAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_bytes(other)
    }
}

impl PartialOrd for IPAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<IpAddr> for IPAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => IPAddress::V4(v4.octets()),
            IpAddr::V6(v6) => IPAddress::V6(v6.octets()),
        }
    }
}

impl From<IPAddress> for IpAddr {
    fn from(addr: IPAddress) -> Self {
        match addr {
            IPAddress::V4(bytes) => IpAddr::V4(Ipv4Addr::from(bytes)),
            IPAddress::V6(bytes) => IpAddr::V6(Ipv6Addr::from(bytes)),
        }
    }
}

impl fmt::Display for IPAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IPAddress::V4(bytes) => {
                write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
            }
            IPAddress::V6(bytes) => {
                let segments: Vec<String> = bytes
                    .chunks(2)
                    .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                    .map(|segment| format!("{:x}", segment))
                    .collect();
                write!(f, "{}", segments.join(":"))
            }
        }
    }
}
