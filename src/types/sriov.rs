//! SR-IOV virtual function descriptors.
//!
//! A VF is described by a short string of the form
//! `INDEX [attr=value]... [vlans=ID[.QOS[.PROTO]];...]`, for example
//! `2 mac=00:11:22:33:44:55 spoof-check=true vlans=100.2.q;200`.

use std::fmt;

use super::error::GrammarError;

/// VLAN protocol of a VF VLAN entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VfVlanProtocol {
    /// 802.1Q
    #[default]
    Q,
    /// 802.1ad (QinQ)
    Ad,
}

impl fmt::Display for VfVlanProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VfVlanProtocol::Q => write!(f, "q"),
            VfVlanProtocol::Ad => write!(f, "ad"),
        }
    }
}

/// One VLAN assignment of a virtual function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfVlan {
    /// VLAN id
    pub id: u32,
    /// Quality-of-service priority
    pub qos: u32,
    /// VLAN protocol
    pub protocol: VfVlanProtocol,
}

/// A single SR-IOV virtual function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SriovVf {
    /// Index of the VF on its physical function
    pub index: u32,
    /// Administrative MAC address
    pub mac: Option<String>,
    /// Whether spoof checking is enforced
    pub spoof_check: Option<bool>,
    /// Whether the VF is trusted
    pub trust: Option<bool>,
    /// Minimum transmit rate in Mbps
    pub min_tx_rate: Option<u32>,
    /// Maximum transmit rate in Mbps
    pub max_tx_rate: Option<u32>,
    /// VLAN assignments, kept sorted by id
    pub vlans: Vec<VfVlan>,
}

impl SriovVf {
    /// Creates a VF with the given index and no attributes.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            mac: None,
            spoof_check: None,
            trust: None,
            min_tx_rate: None,
            max_tx_rate: None,
            vlans: Vec::new(),
        }
    }

    /// Parses a full descriptor string, index first.
    ///
    /// # Errors
    ///
    /// Returns `GrammarError::Vf` for a missing or malformed index, an
    /// unknown attribute name or an unparsable attribute value.
    pub fn parse(desc: &str) -> Result<Self, GrammarError> {
        let mut tokens = desc.split_whitespace();
        let index = tokens
            .next()
            .ok_or_else(|| GrammarError::vf("empty descriptor"))?
            .parse()
            .map_err(|_| GrammarError::vf("index is not a number"))?;

        let mut vf = Self::new(index);
        for token in tokens {
            let (name, value) = token
                .split_once('=')
                .ok_or_else(|| GrammarError::vf(format!("expected 'attr=value', got '{token}'")))?;
            match name {
                "mac" => vf.mac = Some(value.to_string()),
                "spoof-check" => vf.spoof_check = Some(parse_bool(value)?),
                "trust" => vf.trust = Some(parse_bool(value)?),
                "min-tx-rate" => vf.min_tx_rate = Some(parse_u32(name, value)?),
                "max-tx-rate" => vf.max_tx_rate = Some(parse_u32(name, value)?),
                "vlans" => vf.vlans = parse_vlans(value)?,
                _ => return Err(GrammarError::vf(format!("unknown attribute '{name}'"))),
            }
        }
        vf.vlans.sort_by_key(|v| v.id);
        Ok(vf)
    }

    /// Formats the descriptor without its leading index, as stored in a
    /// keyfile (the index lives in the key).
    pub fn format_attributes(&self) -> String {
        let mut parts = Vec::new();
        if let Some(mac) = &self.mac {
            parts.push(format!("mac={mac}"));
        }
        if let Some(rate) = self.max_tx_rate {
            parts.push(format!("max-tx-rate={rate}"));
        }
        if let Some(rate) = self.min_tx_rate {
            parts.push(format!("min-tx-rate={rate}"));
        }
        if let Some(check) = self.spoof_check {
            parts.push(format!("spoof-check={check}"));
        }
        if let Some(trust) = self.trust {
            parts.push(format!("trust={trust}"));
        }
        if !self.vlans.is_empty() {
            let vlans: Vec<String> = self.vlans.iter().map(format_vlan).collect();
            parts.push(format!("vlans={}", vlans.join(";")));
        }
        parts.join(" ")
    }
}

fn parse_bool(value: &str) -> Result<bool, GrammarError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(GrammarError::vf(format!("'{value}' is not a boolean"))),
    }
}

fn parse_u32(name: &str, value: &str) -> Result<u32, GrammarError> {
    value
        .parse()
        .map_err(|_| GrammarError::vf(format!("'{value}' is not a valid {name}")))
}

fn parse_vlans(value: &str) -> Result<Vec<VfVlan>, GrammarError> {
    let mut vlans = Vec::new();
    for item in value.split(';').filter(|i| !i.is_empty()) {
        let mut fields = item.split('.');
        let id = fields
            .next()
            .unwrap_or_default()
            .parse()
            .map_err(|_| GrammarError::vf(format!("invalid VLAN id in '{item}'")))?;
        let qos = match fields.next() {
            Some(q) => q
                .parse()
                .map_err(|_| GrammarError::vf(format!("invalid VLAN qos in '{item}'")))?,
            None => 0,
        };
        let protocol = match fields.next() {
            Some("q") => VfVlanProtocol::Q,
            Some("ad") => VfVlanProtocol::Ad,
            Some(other) => {
                return Err(GrammarError::vf(format!("invalid VLAN protocol '{other}'")))
            }
            None => VfVlanProtocol::Q,
        };
        if fields.next().is_some() {
            return Err(GrammarError::vf(format!("trailing fields in '{item}'")));
        }
        vlans.push(VfVlan { id, qos, protocol });
    }
    Ok(vlans)
}

fn format_vlan(vlan: &VfVlan) -> String {
    match (vlan.qos, vlan.protocol) {
        (0, VfVlanProtocol::Q) => vlan.id.to_string(),
        (qos, VfVlanProtocol::Q) => format!("{}.{qos}", vlan.id),
        (qos, proto) => format!("{}.{qos}.{proto}", vlan.id),
    }
}
