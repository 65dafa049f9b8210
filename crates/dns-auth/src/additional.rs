use dns_types::protocol::types::*;

use crate::cache::ZoneCache;
use crate::predicates::match_glue;

/// Additional-section processing: for every NS or MX in the answer
/// and authority sections, look up the target name and append any A
/// or AAAA records found for it.  Existing additional contents are
/// preserved; an unresolvable target is simply skipped.
pub fn fill_additional<C: ZoneCache>(cache: &C, message: &mut Message) {
    let mut targets: Vec<DomainName> = Vec::new();
    for rr in message.answers.iter().chain(message.authority.iter()) {
        let target = match &rr.data {
            RecordData::NS { nsdname } => nsdname,
            RecordData::MX { exchange, .. } => exchange,
            _ => continue,
        };
        if !targets.contains(target) {
            targets.push(target.clone());
        }
    }

    let is_glue = match_glue();
    for name in &targets {
        for rr in cache.get_records_by_name(name) {
            if is_glue(&rr) {
                message.additional.push(rr);
            }
        }
    }
}
