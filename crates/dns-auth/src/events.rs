use std::net::IpAddr;

use dns_types::protocol::types::*;

/// Fire-and-forget telemetry emitted around each resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveEvent {
    /// A question is about to be resolved.
    Start {
        qname: DomainName,
        qtype: QueryType,
        client: IpAddr,
    },

    /// A response has been built.
    Complete {
        qname: DomainName,
        qtype: QueryType,
        rcode: Rcode,
        client: IpAddr,
    },

    /// A query asked for DNSSEC material.
    DnssecRequest { qname: DomainName, qtype: QueryType },
}

/// Where resolve events go.  Implementations must not block: the
/// resolver calls this inline.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: ResolveEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn notify(&self, _event: ResolveEvent) {}
}
