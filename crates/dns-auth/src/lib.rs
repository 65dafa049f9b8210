#![warn(clippy::pedantic)]
// Sometimes a redundant else is clearer
#![allow(clippy::redundant_else)]
// Don't care enough to fix
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::wildcard_imports)]

//! The query-resolution core of an authoritative-only nameserver.
//!
//! Given a decoded query, a set of authority hints, and the client
//! address, [`Resolver::resolve`] walks the zone cache and produces a
//! decoded response following the RFC 1034 nameserver algorithm:
//! exact-name matching, wildcard expansion, CNAME chasing with loop
//! detection, delegation referrals, and additional-section glue.
//!
//! Everything around the core is a seam: zone storage behind
//! [`cache::ZoneCache`], per-type answer synthesis behind
//! [`handler::RecordHandler`], signing behind
//! [`dnssec::DnssecSigner`], and telemetry behind
//! [`events::EventSink`].

pub mod additional;
pub mod cache;
pub mod dnssec;
pub mod events;
pub mod handler;
pub mod hints;
pub mod predicates;
pub mod resolver;
pub mod rr_util;

pub use self::resolver::{Resolver, ResolverConfig};
