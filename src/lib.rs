pub mod address;
pub mod discovery;
pub mod host;
pub mod ids;
pub mod logging;

pub use address::IPAddress;
pub use host::{AppMapping, ApplicationEntry, HostRecord, HostTrackerStats};
pub use ids::{AppId, IpProtocol, Policy, Port, ProtocolId};
