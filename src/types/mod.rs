//! Domain value types carried by connection settings.
//!
//! These are the structured values the codec parses keyfile text into:
//! IP addresses and routes with typed attributes, SR-IOV virtual function
//! descriptors, traffic-control qdiscs and filters, and certificate
//! references.

mod cert;
mod error;
mod ip;
mod sriov;
mod tc;

pub use cert::CertValue;
pub use error::GrammarError;
pub use ip::{
    format_route_attributes, parse_route_attributes, AddrFamily, IpAddress, IpRoute, RouteAttr,
};
pub use sriov::{SriovVf, VfVlan, VfVlanProtocol};
pub use tc::{
    format_tc_handle, parse_tc_handle, TcQdisc, TcTfilter, TC_HANDLE_ROOT, TC_HANDLE_UNSPEC,
};
