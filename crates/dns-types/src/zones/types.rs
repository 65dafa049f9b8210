use std::collections::HashMap;
use std::sync::Arc;

use crate::protocol::types::*;

/// A collection of zones, keyed by apex name.
///
/// Zones are shared as `Arc` snapshots: a zone is immutable once
/// built, and a loader publishes updates by inserting a replacement.
#[derive(Debug, Clone, Default)]
pub struct Zones {
    zones: HashMap<DomainName, Arc<Zone>>,
}

impl Zones {
    pub fn new() -> Self {
        Self {
            zones: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Find the nearest enclosing zone for a name, if there is one:
    /// try the name itself, then each parent name in turn.
    pub fn get(&self, name: &DomainName) -> Option<Arc<Zone>> {
        for i in 0..name.labels.len() {
            let labels = &name.labels[i..];
            if let Some(apex) = DomainName::from_labels(labels.into()) {
                if let Some(zone) = self.zones.get(&apex) {
                    return Some(Arc::clone(zone));
                }
            }
        }

        None
    }

    /// Fetch a zone by its exact apex name.
    pub fn get_exact(&self, apex: &DomainName) -> Option<Arc<Zone>> {
        self.zones.get(apex).map(Arc::clone)
    }

    /// Create or replace a zone.
    pub fn insert(&mut self, zone: Zone) {
        self.zones.insert(zone.name().clone(), Arc::new(zone));
    }
}

/// A read-only snapshot of one zone: all the records belonging to a
/// single apex, indexed for resolution.
///
/// The resolver never mutates a zone; lookups hand out clones of the
/// indexed records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// The apex name all records of this zone live under.
    name: DomainName,

    /// Opaque version tag assigned by whatever loaded the zone.
    version: String,

    /// The SOA record(s) at the apex.
    authority: Vec<ResourceRecord>,

    /// Records indexed by owner name.
    records_by_name: HashMap<DomainName, Vec<ResourceRecord>>,

    /// Records indexed by type.
    records_by_type: HashMap<RecordType, Vec<ResourceRecord>>,

    /// How many records the zone holds.
    record_count: usize,
}

impl Zone {
    /// Build a zone from a flat record list.  Records whose owner is
    /// not at or below the apex are discarded.  SOA records at the
    /// apex become the zone's authority.
    pub fn new(name: DomainName, records: Vec<ResourceRecord>) -> Self {
        let mut authority = Vec::new();
        let mut records_by_name: HashMap<DomainName, Vec<ResourceRecord>> = HashMap::new();
        let mut records_by_type: HashMap<RecordType, Vec<ResourceRecord>> = HashMap::new();
        let mut record_count = 0;

        for rr in records {
            if !rr.name.is_subdomain_of(&name) {
                continue;
            }

            if rr.rtype() == RecordType::SOA && rr.name == name {
                authority.push(rr.clone());
            }

            record_count += 1;
            records_by_type
                .entry(rr.rtype())
                .or_default()
                .push(rr.clone());
            records_by_name.entry(rr.name.clone()).or_default().push(rr);
        }

        Self {
            name,
            version: String::new(),
            authority,
            records_by_name,
            records_by_type,
            record_count,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The apex name.
    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The SOA record(s) at the apex.
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// The apex SOA, if the zone has one.
    pub fn soa(&self) -> Option<&ResourceRecord> {
        self.authority.first()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// All records with the given owner name.  Owner names were
    /// lowercased on construction, so this is case-insensitive.
    pub fn records_at(&self, name: &DomainName) -> &[ResourceRecord] {
        self.records_by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Records with the given owner name and type.
    pub fn records_at_with_type(
        &self,
        name: &DomainName,
        rtype: RecordType,
    ) -> Vec<ResourceRecord> {
        self.records_at(name)
            .iter()
            .filter(|rr| rr.rtype() == rtype)
            .cloned()
            .collect()
    }

    /// All records of the given type, anywhere in the zone.
    pub fn records_of_type(&self, rtype: RecordType) -> &[ResourceRecord] {
        self.records_by_type.get(&rtype).map_or(&[], Vec::as_slice)
    }

    /// NS records owned by `name`, unless `name` is the apex: NS at
    /// the apex are the zone's own nameservers, not a delegation.
    pub fn delegations_at(&self, name: &DomainName) -> Vec<ResourceRecord> {
        if *name == self.name {
            return Vec::new();
        }

        self.records_at_with_type(name, RecordType::NS)
    }

    /// True if the name is at or below the apex.
    pub fn covers(&self, name: &DomainName) -> bool {
        name.is_subdomain_of(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::protocol::types::test_util::*;

    fn example_zone() -> Zone {
        Zone::new(
            domain("example.com."),
            vec![
                soa_record("example.com.", 1800),
                ns_record("example.com.", "ns1.example.com."),
                a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4)),
                txt_record("www.example.com.", b"hello"),
                ns_record("sub.example.com.", "ns1.sub.example.com."),
                a_record("ns1.sub.example.com.", Ipv4Addr::new(9, 9, 9, 9)),
            ],
        )
    }

    #[test]
    fn zone_indexes_by_name_and_type() {
        let zone = example_zone();

        assert_eq!(6, zone.record_count());
        assert_eq!(2, zone.records_at(&domain("www.example.com.")).len());
        assert_eq!(
            vec![a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4))],
            zone.records_at_with_type(&domain("www.example.com."), RecordType::A)
        );
        assert_eq!(2, zone.records_of_type(RecordType::NS).len());
        assert!(zone.records_at(&domain("nope.example.com.")).is_empty());
    }

    #[test]
    fn zone_extracts_authority() {
        let zone = example_zone();

        assert_eq!(vec![soa_record("example.com.", 1800)], zone.authority());
        assert_eq!(Some(&soa_record("example.com.", 1800)), zone.soa());
    }

    #[test]
    fn zone_without_soa_has_no_authority() {
        let zone = Zone::new(
            domain("example.com."),
            vec![a_record("www.example.com.", Ipv4Addr::new(1, 1, 1, 1))],
        );

        assert!(zone.authority().is_empty());
        assert_eq!(None, zone.soa());
    }

    #[test]
    fn zone_discards_out_of_zone_records() {
        let zone = Zone::new(
            domain("example.com."),
            vec![
                a_record("www.example.com.", Ipv4Addr::new(1, 1, 1, 1)),
                a_record("www.example.net.", Ipv4Addr::new(2, 2, 2, 2)),
            ],
        );

        assert_eq!(1, zone.record_count());
        assert!(zone.records_at(&domain("www.example.net.")).is_empty());
    }

    #[test]
    fn zone_delegations_exclude_apex() {
        let zone = example_zone();

        assert_eq!(
            vec![ns_record("sub.example.com.", "ns1.sub.example.com.")],
            zone.delegations_at(&domain("sub.example.com."))
        );
        assert!(zone.delegations_at(&domain("example.com.")).is_empty());
    }

    #[test]
    fn zone_covers() {
        let zone = example_zone();

        assert!(zone.covers(&domain("example.com.")));
        assert!(zone.covers(&domain("deep.under.example.com.")));
        assert!(!zone.covers(&domain("example.net.")));
        assert!(!zone.covers(&domain("com.")));
    }

    #[test]
    fn zone_lookup_is_case_insensitive() {
        let zone = example_zone();

        assert_eq!(
            zone.records_at(&domain("www.example.com.")),
            zone.records_at(&domain("WWW.EXAMPLE.COM."))
        );
    }

    #[test]
    fn zones_get_walks_to_nearest_apex() {
        let mut zones = Zones::new();
        zones.insert(example_zone());
        zones.insert(Zone::new(
            domain("sub.example.com."),
            vec![soa_record("sub.example.com.", 60)],
        ));

        assert!(zones.get(&domain(".")).is_none());
        assert!(zones.get(&domain("com.")).is_none());
        assert_eq!(
            Some(domain("example.com.")),
            zones
                .get(&domain("www.example.com."))
                .map(|z| z.name().clone())
        );
        assert_eq!(
            Some(domain("sub.example.com.")),
            zones
                .get(&domain("host.sub.example.com."))
                .map(|z| z.name().clone())
        );
    }

    #[test]
    fn zone_indexes_arbitrary_records() {
        for _ in 0..100 {
            let apex = domain("example.com.");
            let mut rr = arbitrary_resourcerecord();
            rr.class = RecordClass::IN;
            let mut labels = vec![];
            if let Some(first) = rr.name.labels.first() {
                if !first.is_empty() {
                    labels.push(first.clone());
                }
            }
            labels.extend(apex.labels.clone());
            rr.name = DomainName::from_labels(labels).unwrap();

            let zone = Zone::new(apex, vec![rr.clone()]);

            assert_eq!(vec![rr.clone()], zone.records_at(&rr.name));
            assert_eq!(vec![rr.clone()], zone.records_of_type(rr.rtype()));
        }
    }
}
