//! The root nameservers, compiled in.  Served when no local zone is
//! authoritative for a query name, so a client stub pointed only at
//! this server can still find its way to the root.

use std::net::Ipv4Addr;

use dns_types::protocol::types::*;

/// TTL of the root NS RRset, from the canonical hints file.
const ROOT_NS_TTL: u32 = 518_400;

/// TTL of the root server glue, from the canonical hints file.
const ROOT_GLUE_TTL: u32 = 3_600_000;

/// The thirteen root servers and their published IPv4 addresses.
const ROOT_SERVERS: [(&str, Ipv4Addr); 13] = [
    ("a.root-servers.net.", Ipv4Addr::new(198, 41, 0, 4)),
    ("b.root-servers.net.", Ipv4Addr::new(170, 247, 170, 2)),
    ("c.root-servers.net.", Ipv4Addr::new(192, 33, 4, 12)),
    ("d.root-servers.net.", Ipv4Addr::new(199, 7, 91, 13)),
    ("e.root-servers.net.", Ipv4Addr::new(192, 203, 230, 10)),
    ("f.root-servers.net.", Ipv4Addr::new(192, 5, 5, 241)),
    ("g.root-servers.net.", Ipv4Addr::new(192, 112, 36, 4)),
    ("h.root-servers.net.", Ipv4Addr::new(198, 97, 190, 53)),
    ("i.root-servers.net.", Ipv4Addr::new(192, 36, 148, 17)),
    ("j.root-servers.net.", Ipv4Addr::new(192, 58, 128, 30)),
    ("k.root-servers.net.", Ipv4Addr::new(193, 0, 14, 129)),
    ("l.root-servers.net.", Ipv4Addr::new(199, 7, 83, 42)),
    ("m.root-servers.net.", Ipv4Addr::new(202, 12, 27, 33)),
];

/// The root NS RRset and its A glue.
#[allow(clippy::missing_panics_doc)]
pub fn root_hints() -> (Vec<ResourceRecord>, Vec<ResourceRecord>) {
    let root = DomainName::root_domain();
    let mut ns_rrs = Vec::with_capacity(ROOT_SERVERS.len());
    let mut glue_rrs = Vec::with_capacity(ROOT_SERVERS.len());

    for (host, address) in ROOT_SERVERS {
        // safe: the table is static and well-formed
        let nsdname = DomainName::from_dotted_string(host).unwrap();
        ns_rrs.push(ResourceRecord {
            name: root.clone(),
            data: RecordData::NS {
                nsdname: nsdname.clone(),
            },
            class: RecordClass::IN,
            ttl: ROOT_NS_TTL,
        });
        glue_rrs.push(ResourceRecord {
            name: nsdname,
            data: RecordData::A { address },
            class: RecordClass::IN,
            ttl: ROOT_GLUE_TTL,
        });
    }

    (ns_rrs, glue_rrs)
}
