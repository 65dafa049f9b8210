use std::fmt;
use std::sync::Arc;

use dns_types::protocol::types::*;
use dns_types::zones::types::{Zone, Zones};

/// Why a zone lookup produced nothing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ZoneLookupError {
    /// No locally hosted zone covers the name.
    NotAuthoritative,
}

impl fmt::Display for ZoneLookupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "not authoritative for name")
    }
}

impl std::error::Error for ZoneLookupError {}

/// Why no authority records could be found for a name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AuthorityError {
    NotFound,
}

impl fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "authority not found")
    }
}

impl std::error::Error for AuthorityError {}

/// The zone storage seam the resolver reads through.
///
/// Implementations hand out `Arc<Zone>` snapshots: the resolver holds
/// one zone for the length of a resolution, so a writer publishing a
/// new snapshot mid-query cannot produce a torn answer.
pub trait ZoneCache: Send + Sync {
    /// The nearest zone covering `qname`.  If none does, the fallback
    /// authority record (when given) anchors the search instead.
    fn find_zone(
        &self,
        qname: &DomainName,
        fallback: Option<&ResourceRecord>,
    ) -> Result<Arc<Zone>, ZoneLookupError>;

    /// A zone by its exact apex name.
    fn get_zone_with_records(&self, apex: &DomainName) -> Result<Arc<Zone>, ZoneLookupError>;

    /// All records owned by a name, in whichever zone covers it.
    /// Case-insensitive.
    fn get_records_by_name(&self, name: &DomainName) -> Vec<ResourceRecord>;

    /// Records owned by a name, restricted to one type.
    fn get_records_by_name_and_type(
        &self,
        name: &DomainName,
        rtype: RecordType,
    ) -> Vec<ResourceRecord>;

    /// NS records delegating `name` away, excluding apex NS records.
    fn get_delegations(&self, name: &DomainName) -> Vec<ResourceRecord>;

    /// The SOA records of the zone covering `qname`.
    fn get_authority(&self, qname: &DomainName) -> Result<Vec<ResourceRecord>, AuthorityError>;

    /// True if some locally hosted zone covers the name.
    fn in_zone(&self, name: &DomainName) -> bool;

    /// True if `qname` falls inside the zone with the given apex.
    fn record_name_in_zone(&self, zone_name: &DomainName, qname: &DomainName) -> bool;
}

impl ZoneCache for Zones {
    fn find_zone(
        &self,
        qname: &DomainName,
        fallback: Option<&ResourceRecord>,
    ) -> Result<Arc<Zone>, ZoneLookupError> {
        if let Some(zone) = self.get(qname) {
            return Ok(zone);
        }
        if let Some(rr) = fallback {
            if let Some(zone) = self.get(&rr.name) {
                return Ok(zone);
            }
        }

        Err(ZoneLookupError::NotAuthoritative)
    }

    fn get_zone_with_records(&self, apex: &DomainName) -> Result<Arc<Zone>, ZoneLookupError> {
        self.get_exact(apex).ok_or(ZoneLookupError::NotAuthoritative)
    }

    fn get_records_by_name(&self, name: &DomainName) -> Vec<ResourceRecord> {
        self.get(name)
            .map(|zone| zone.records_at(name).to_vec())
            .unwrap_or_default()
    }

    fn get_records_by_name_and_type(
        &self,
        name: &DomainName,
        rtype: RecordType,
    ) -> Vec<ResourceRecord> {
        self.get(name)
            .map(|zone| zone.records_at_with_type(name, rtype))
            .unwrap_or_default()
    }

    fn get_delegations(&self, name: &DomainName) -> Vec<ResourceRecord> {
        self.get(name)
            .map(|zone| zone.delegations_at(name))
            .unwrap_or_default()
    }

    fn get_authority(&self, qname: &DomainName) -> Result<Vec<ResourceRecord>, AuthorityError> {
        match self.get(qname) {
            Some(zone) if !zone.authority().is_empty() => Ok(zone.authority().to_vec()),
            _ => Err(AuthorityError::NotFound),
        }
    }

    fn in_zone(&self, name: &DomainName) -> bool {
        self.get(name).is_some()
    }

    fn record_name_in_zone(&self, zone_name: &DomainName, qname: &DomainName) -> bool {
        self.get_exact(zone_name)
            .is_some_and(|zone| zone.covers(qname))
    }
}
