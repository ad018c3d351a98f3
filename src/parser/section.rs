//! Section typing for block headers
//!
//! The block-opener table is fixed and priority-ordered: entries are
//! compared token-wise and case-insensitively against the start of a header,
//! and the first entry that matches wins. Longer prefixes are listed before
//! the shorter ones they extend (`router ospf` before `router`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature category of a config block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Interface,
    Vlan,
    RouterOspf,
    RouterOspfv3,
    RouterBgp,
    RouterEigrp,
    RouterRip,
    RouterIsis,
    Router,
    AccessList,
    PrefixList,
    RouteMap,
    StaticRoute,
    Vrf,
    Line,
    Aaa,
    User,
    Snmp,
    Ntp,
    Logging,
    SpanningTree,
    ClassMap,
    PolicyMap,
    Crypto,
    Banner,
    /// Top-level command that is not a recognized block opener
    Global,
    /// Preamble, or anything else with no recognizable header
    Unknown,
}

/// Block openers in priority order
const OPENERS: &[(&[&str], SectionType)] = &[
    (&["interface"], SectionType::Interface),
    (&["vlan"], SectionType::Vlan),
    (&["router", "ospf"], SectionType::RouterOspf),
    (&["router", "ospfv3"], SectionType::RouterOspfv3),
    (&["ipv6", "router", "ospf"], SectionType::RouterOspfv3),
    (&["router", "bgp"], SectionType::RouterBgp),
    (&["router", "eigrp"], SectionType::RouterEigrp),
    (&["router", "rip"], SectionType::RouterRip),
    (&["router", "isis"], SectionType::RouterIsis),
    (&["router"], SectionType::Router),
    (&["ip", "access-list"], SectionType::AccessList),
    (&["ipv6", "access-list"], SectionType::AccessList),
    (&["mac", "access-list"], SectionType::AccessList),
    (&["access-list"], SectionType::AccessList),
    (&["ip", "prefix-list"], SectionType::PrefixList),
    (&["ipv6", "prefix-list"], SectionType::PrefixList),
    (&["route-map"], SectionType::RouteMap),
    (&["ip", "route"], SectionType::StaticRoute),
    (&["ipv6", "route"], SectionType::StaticRoute),
    (&["ip", "vrf"], SectionType::Vrf),
    (&["vrf"], SectionType::Vrf),
    (&["line"], SectionType::Line),
    (&["aaa"], SectionType::Aaa),
    (&["tacacs-server"], SectionType::Aaa),
    (&["radius-server"], SectionType::Aaa),
    (&["username"], SectionType::User),
    (&["user"], SectionType::User),
    (&["snmp-server"], SectionType::Snmp),
    (&["snmpv3"], SectionType::Snmp),
    (&["ntp"], SectionType::Ntp),
    (&["logging"], SectionType::Logging),
    (&["spanning-tree"], SectionType::SpanningTree),
    (&["class-map"], SectionType::ClassMap),
    (&["policy-map"], SectionType::PolicyMap),
    (&["crypto"], SectionType::Crypto),
    (&["banner"], SectionType::Banner),
];

impl SectionType {
    /// Look up the section a header opens, if it is a recognized opener
    pub fn from_header(header: &str) -> Option<Self> {
        let tokens: Vec<String> = header
            .split_whitespace()
            .map(|t| t.to_ascii_lowercase())
            .collect();

        OPENERS
            .iter()
            .find(|(keywords, _)| {
                keywords.len() <= tokens.len()
                    && keywords.iter().zip(&tokens).all(|(k, t)| *k == t.as_str())
            })
            .map(|(_, section)| *section)
    }

    /// Stable snake_case name used in metadata filters and output
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Interface => "interface",
            SectionType::Vlan => "vlan",
            SectionType::RouterOspf => "router_ospf",
            SectionType::RouterOspfv3 => "router_ospfv3",
            SectionType::RouterBgp => "router_bgp",
            SectionType::RouterEigrp => "router_eigrp",
            SectionType::RouterRip => "router_rip",
            SectionType::RouterIsis => "router_isis",
            SectionType::Router => "router",
            SectionType::AccessList => "access_list",
            SectionType::PrefixList => "prefix_list",
            SectionType::RouteMap => "route_map",
            SectionType::StaticRoute => "static_route",
            SectionType::Vrf => "vrf",
            SectionType::Line => "line",
            SectionType::Aaa => "aaa",
            SectionType::User => "user",
            SectionType::Snmp => "snmp",
            SectionType::Ntp => "ntp",
            SectionType::Logging => "logging",
            SectionType::SpanningTree => "spanning_tree",
            SectionType::ClassMap => "class_map",
            SectionType::PolicyMap => "policy_map",
            SectionType::Crypto => "crypto",
            SectionType::Banner => "banner",
            SectionType::Global => "global",
            SectionType::Unknown => "unknown",
        }
    }

    /// Parse a snake_case section name; unrecognized names map to `Unknown`
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|s| s.as_str() == name)
            .unwrap_or(SectionType::Unknown)
    }

    /// Every variant, in declaration order
    pub fn all() -> &'static [SectionType] {
        &[
            SectionType::Interface,
            SectionType::Vlan,
            SectionType::RouterOspf,
            SectionType::RouterOspfv3,
            SectionType::RouterBgp,
            SectionType::RouterEigrp,
            SectionType::RouterRip,
            SectionType::RouterIsis,
            SectionType::Router,
            SectionType::AccessList,
            SectionType::PrefixList,
            SectionType::RouteMap,
            SectionType::StaticRoute,
            SectionType::Vrf,
            SectionType::Line,
            SectionType::Aaa,
            SectionType::User,
            SectionType::Snmp,
            SectionType::Ntp,
            SectionType::Logging,
            SectionType::SpanningTree,
            SectionType::ClassMap,
            SectionType::PolicyMap,
            SectionType::Crypto,
            SectionType::Banner,
            SectionType::Global,
            SectionType::Unknown,
        ]
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
