use dns_types::protocol::types::*;
use dns_types::zones::types::Zone;

/// The seam a DNSSEC signing engine plugs into.  The resolver calls
/// these at three points: once over the finished response, once for
/// each handler-produced RRset, and when a DNSKEY query reaches a
/// zone apex.
pub trait DnssecSigner: Send + Sync {
    /// Post-resolution pass over the whole response.
    fn handle(
        &self,
        message: Message,
        zone: &Zone,
        qname: &DomainName,
        qtype: QueryType,
    ) -> Message;

    /// Attach signatures to a freshly built RRset, if the zone is
    /// signed.
    fn maybe_sign_rrset(
        &self,
        message: &Message,
        rrs: Vec<ResourceRecord>,
        zone: &Zone,
    ) -> Vec<ResourceRecord>;

    /// The DNSKEY RRset to serve at the apex.
    fn dnskey_rrset(&self, message: &Message, zone: &Zone) -> Vec<ResourceRecord>;
}

/// Signing disabled: every hook is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSigner;

impl DnssecSigner for NoopSigner {
    fn handle(
        &self,
        message: Message,
        _zone: &Zone,
        _qname: &DomainName,
        _qtype: QueryType,
    ) -> Message {
        message
    }

    fn maybe_sign_rrset(
        &self,
        _message: &Message,
        rrs: Vec<ResourceRecord>,
        _zone: &Zone,
    ) -> Vec<ResourceRecord> {
        rrs
    }

    fn dnskey_rrset(&self, _message: &Message, _zone: &Zone) -> Vec<ResourceRecord> {
        Vec::new()
    }
}
