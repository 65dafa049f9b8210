//! Predicate factories over resource records, for use with iterator
//! filters.  Each returns a closure capturing its parameters, and
//! [`not_match`] inverts any of them.

use dns_types::protocol::types::*;

/// Records owned by the given name.
pub fn match_name(name: DomainName) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| rr.name == name
}

/// Records of the given type.
pub fn match_type(rtype: RecordType) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| rr.rtype() == rtype
}

/// Records of any of the given types.
pub fn match_types(rtypes: Vec<RecordType>) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| rtypes.contains(&rr.rtype())
}

/// Records owned by the given name, of the given type.
pub fn match_name_and_type(
    name: DomainName,
    rtype: RecordType,
) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| rr.name == name && rr.rtype() == rtype
}

/// Records whose owner is a wildcard name.
pub fn match_wildcard() -> impl Fn(&ResourceRecord) -> bool {
    |rr| rr.name.is_wildcard()
}

/// NS records delegating to the given nameserver.
pub fn match_delegation(nsdname: DomainName) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| match &rr.data {
        RecordData::NS { nsdname: d } => *d == nsdname,
        _ => false,
    }
}

/// Address records usable as glue.
pub fn match_glue() -> impl Fn(&ResourceRecord) -> bool {
    |rr| matches!(rr.data, RecordData::A { .. } | RecordData::AAAA { .. })
}

/// Invert a predicate.
pub fn not_match(p: impl Fn(&ResourceRecord) -> bool) -> impl Fn(&ResourceRecord) -> bool {
    move |rr| !p(rr)
}
