use std::collections::{HashMap, HashSet};

use dns_types::protocol::types::*;

/// If `name` matches `qname` (it is `qname`, or a wildcard pattern
/// covering it), return `qname`; otherwise return `name` unchanged.
///
/// This is how wildcard owners are rewritten before records go into a
/// response: a `*` label must never escape into an answer.
pub fn wildcard_substitution(name: &DomainName, qname: &DomainName) -> DomainName {
    if dname_match(qname, name) {
        qname.clone()
    } else {
        name.clone()
    }
}

/// True iff `pattern` is `name` itself, or a wildcard pattern whose
/// non-wildcard suffix equals the corresponding suffix of `name`.
pub fn dname_match(name: &DomainName, pattern: &DomainName) -> bool {
    if name == pattern {
        return true;
    }
    if !pattern.is_wildcard() {
        return false;
    }
    if name.labels.len() < pattern.labels.len() {
        return false;
    }

    let suffix = &pattern.labels[1..];
    name.labels[name.labels.len() - suffix.len()..] == *suffix
}

/// Strict subdomain test: a name is not a subdomain of itself.
pub fn is_subdomain(parent: &DomainName, child: &DomainName) -> bool {
    child.labels.len() > parent.labels.len() && child.is_subdomain_of(parent)
}

/// Group records into RRsets by type.  The outer list follows the
/// order each type first appears; records keep their order within a
/// set.
pub fn records_to_rrsets(records: Vec<ResourceRecord>) -> Vec<Vec<ResourceRecord>> {
    let mut order = Vec::new();
    let mut sets: HashMap<RecordType, Vec<ResourceRecord>> = HashMap::new();

    for rr in records {
        let rtype = rr.rtype();
        if !sets.contains_key(&rtype) {
            order.push(rtype);
        }
        sets.entry(rtype).or_default().push(rr);
    }

    order.into_iter().filter_map(|t| sets.remove(&t)).collect()
}

/// Clamp a SOA record's TTL down to its own MINIMUM field, the
/// negative-answer TTL of RFC 2308.  Anything other than a SOA is
/// returned untouched.
pub fn minimum_soa_ttl(mut rr: ResourceRecord) -> ResourceRecord {
    if let RecordData::SOA { minimum, .. } = rr.data {
        rr.ttl = std::cmp::min(rr.ttl, minimum);
    }
    rr
}

/// Apply [`minimum_soa_ttl`] across a whole section.
pub fn clamp_soa_ttls(rrs: &mut Vec<ResourceRecord>) {
    for rr in rrs.iter_mut() {
        *rr = minimum_soa_ttl(rr.clone());
    }
}

/// Put the answer section into its canonical order: exact duplicates
/// dropped (first occurrence wins), CNAMEs first in chain order, then
/// everything else in the total structural order.
pub fn sort_answers(answers: &mut Vec<ResourceRecord>) {
    let mut seen = HashSet::new();
    answers.retain(|rr| seen.insert(rr.clone()));

    let mut cnames = Vec::new();
    let mut rest = Vec::new();
    for rr in answers.drain(..) {
        if rr.rtype() == RecordType::CNAME {
            cnames.push(rr);
        } else {
            rest.push(rr);
        }
    }
    rest.sort();

    answers.extend(chain_order(cnames));
    answers.append(&mut rest);
}

/// Order CNAME RRs so that an alias precedes the record its target
/// names, yielding each chain head-first.  Records participating in a
/// cycle keep their original relative order at the end.
fn chain_order(mut remaining: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
    let targets: HashSet<DomainName> = remaining
        .iter()
        .filter_map(|rr| match &rr.data {
            RecordData::CNAME { cname } => Some(cname.clone()),
            _ => None,
        })
        .collect();

    let mut heads = Vec::new();
    let mut i = 0;
    while i < remaining.len() {
        if targets.contains(&remaining[i].name) {
            i += 1;
        } else {
            heads.push(remaining.remove(i));
        }
    }

    let mut out = Vec::with_capacity(heads.len() + remaining.len());
    for head in heads {
        let mut current = head;
        loop {
            let RecordData::CNAME { cname: target } = current.data.clone() else {
                out.push(current);
                break;
            };
            out.push(current);

            match remaining.iter().position(|rr| rr.name == target) {
                Some(idx) => current = remaining.remove(idx),
                None => break,
            }
        }
    }

    out.append(&mut remaining);
    out
}
