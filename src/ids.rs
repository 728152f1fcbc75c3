use etherparse::IpNumber;
use std::fmt;

pub type Port = u16;

/// Transport protocol number carried in the IP header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IpProtocol(pub u8);

impl IpProtocol {
    pub const TCP: IpProtocol = IpProtocol(6);
    pub const UDP: IpProtocol = IpProtocol(17);
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        IpProtocol(value)
    }
}

impl From<IpNumber> for IpProtocol {
    fn from(value: IpNumber) -> Self {
        IpProtocol(value.0)
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IpProtocol::TCP => write!(f, "tcp"),
            IpProtocol::UDP => write!(f, "udp"),
            IpProtocol(other) => write!(f, "proto-{other}"),
        }
    }
}

/// Identifier handed out by application identification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AppId(pub i32);

impl AppId {
    pub const NONE: AppId = AppId(0);

    pub fn is_none(self) -> bool {
        self == AppId::NONE
    }
}

/// Application-layer protocol identifier, distinct from [`IpProtocol`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProtocolId(pub u16);

impl ProtocolId {
    pub const UNKNOWN: ProtocolId = ProtocolId(0);

    pub fn is_unknown(self) -> bool {
        self == ProtocolId::UNKNOWN
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Stream reassembly or defrag policy code. Interpretation lives elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Policy(pub u8);

impl Policy {
    pub const UNSET: Policy = Policy(0);
}
