use std::net::IpAddr;
use std::sync::Arc;

use dns_types::protocol::types::*;
use dns_types::zones::types::Zone;

use crate::additional::fill_additional;
use crate::cache::{ZoneCache, ZoneLookupError};
use crate::dnssec::{DnssecSigner, NoopSigner};
use crate::events::{EventSink, NullEventSink, ResolveEvent};
use crate::handler::HandlerRegistry;
use crate::hints::root_hints;
use crate::predicates::{match_type, match_wildcard};
use crate::rr_util::{clamp_soa_ttls, records_to_rrsets, sort_answers, wildcard_substitution};

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Answer with the root NS RRset when no local zone is
    /// authoritative for the query name.
    pub serve_root_hints: bool,

    /// How many CNAMEs one resolution may follow.  Exceeding this is
    /// treated exactly like a detected loop.
    pub cname_chain_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            serve_root_hints: true,
            cname_chain_limit: 8,
        }
    }
}

/// An authoritative-only resolver over a zone cache.
///
/// [`Resolver::resolve`] is a pure function of the query, the cache
/// snapshot, and the client address: it builds a fresh response and
/// mutates no shared state, so one resolver can serve any number of
/// threads.  Failures never escape as errors; they surface as the
/// response rcode.
pub struct Resolver<C> {
    cache: C,
    config: ResolverConfig,
    handlers: HandlerRegistry,
    signer: Box<dyn DnssecSigner>,
    events: Box<dyn EventSink>,
}

impl<C: ZoneCache> Resolver<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            config: ResolverConfig::default(),
            handlers: HandlerRegistry::new(),
            signer: Box::new(NoopSigner),
            events: Box::new(NullEventSink),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_signer(mut self, signer: Box<dyn DnssecSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_events(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolve the first question of a decoded query message into a
    /// decoded response message.
    ///
    /// Only the first question is answered; any others are dropped
    /// from the response.  `authority_hints` anchors the zone search
    /// when the query name itself matches no local zone (the last
    /// hint wins).  A message with no question at all is returned
    /// unchanged.
    pub fn resolve(
        &self,
        message: Message,
        authority_hints: &[ResourceRecord],
        client: IpAddr,
    ) -> Message {
        let Some(question) = message.questions.first().cloned() else {
            return message;
        };

        let _span = tracing::error_span!("resolve", %question, %client).entered();
        self.events.notify(ResolveEvent::Start {
            qname: question.name.clone(),
            qtype: question.qtype,
            client,
        });

        let mut response = message;
        response.header.is_response = true;
        response.header.recursion_available = false;
        response.header.authentic_data = false;
        response.header.checking_disabled = false;
        response.questions.truncate(1);

        if question.qtype == QueryType::Record(RecordType::RRSIG) {
            // signatures are served attached to the RRsets they
            // cover, never on their own
            tracing::debug!("refusing RRSIG query");
            response.header.rcode = Rcode::Refused;
            response.header.is_authoritative = false;
            self.notify_complete(&question, &response, client);
            return response;
        }

        match self.cache.find_zone(&question.name, authority_hints.last()) {
            Ok(zone) => {
                let _zone_span = tracing::error_span!("zone", apex = %zone.name()).entered();

                let mut chain = Vec::new();
                response = self.resolve_in_zone(
                    response,
                    &question.name,
                    question.qtype,
                    &zone,
                    &question,
                    &mut chain,
                );

                clamp_soa_ttls(&mut response.authority);
                response = self
                    .signer
                    .handle(response, &zone, &question.name, question.qtype);
                fill_additional(&self.cache, &mut response);
                sort_answers(&mut response.answers);
            }
            Err(ZoneLookupError::NotAuthoritative) => {
                tracing::debug!("no authoritative zone for query name");
                response.header.is_authoritative = true;
                response.header.rcode = Rcode::NoError;
                if self.config.serve_root_hints {
                    let (ns_rrs, glue_rrs) = root_hints();
                    response.authority.extend(ns_rrs);
                    response.additional.extend(glue_rrs);
                }
            }
        }

        self.notify_complete(&question, &response, client);
        response
    }

    fn notify_complete(&self, question: &Question, response: &Message, client: IpAddr) {
        self.events.notify(ResolveEvent::Complete {
            qname: question.name.clone(),
            qtype: question.qtype,
            rcode: response.header.rcode,
            client,
        });
    }

    /// One resolution step within a zone: a referral if the name sits
    /// below a delegation boundary, otherwise exact-name or
    /// best-match resolution.
    fn resolve_in_zone(
        &self,
        mut response: Message,
        qname: &DomainName,
        qtype: QueryType,
        zone: &Arc<Zone>,
        question: &Question,
        chain: &mut Vec<ResourceRecord>,
    ) -> Message {
        let cut_rrs = self.detect_zonecut(zone, qname);
        if !cut_rrs.is_empty() {
            tracing::trace!("got zone cut");

            // the only answers which survive a referral are CNAMEs
            // leading below the cut
            let cut_name = cut_rrs[0].name.clone();
            response.answers.retain(|rr| match &rr.data {
                RecordData::CNAME { cname } => cname.is_subdomain_of(&cut_name),
                _ => false,
            });

            response.header.is_authoritative = false;
            response.authority.extend(cut_rrs);
            return response;
        }

        let matched = self.cache.get_records_by_name(qname);
        if matched.is_empty() {
            self.resolve_best_match(response, qname, qtype, zone, question, chain)
        } else {
            self.resolve_exact_match(response, qname, qtype, matched, zone, question, chain)
        }
    }

    /// The query name exists.  Chase a CNAME, answer the matching
    /// types, hand out a referral, or fall back to handlers and the
    /// no-data response.
    #[allow(clippy::too_many_arguments)]
    fn resolve_exact_match(
        &self,
        mut response: Message,
        qname: &DomainName,
        qtype: QueryType,
        matched: Vec<ResourceRecord>,
        zone: &Arc<Zone>,
        question: &Question,
        chain: &mut Vec<ResourceRecord>,
    ) -> Message {
        let is_cname = match_type(RecordType::CNAME);
        let cname_rrs: Vec<ResourceRecord> =
            matched.iter().filter(|rr| is_cname(rr)).cloned().collect();

        if !cname_rrs.is_empty() {
            if qtype == QueryType::Record(RecordType::CNAME) {
                tracing::trace!("got exact CNAME answer");
                response.header.is_authoritative = true;
                response.answers.extend(cname_rrs);
                return response;
            }
            return self.chase_cname(response, qtype, cname_rrs, zone, question, chain);
        }

        let type_matches = self.filter_by_qtype(qtype, &matched);
        if !type_matches.is_empty() {
            return self.resolve_exact_type_match(response, qname, qtype, type_matches, &matched, zone);
        }

        // the name exists, but not with this type
        let is_ns = match_type(RecordType::NS);
        let ns_rrs: Vec<ResourceRecord> = matched.iter().filter(|rr| is_ns(rr)).cloned().collect();
        if !ns_rrs.is_empty() && qname != zone.name() {
            tracing::trace!("got referral at delegation point");
            response.header.is_authoritative = false;
            response.authority.extend(ns_rrs);
            return response;
        }

        let custom = self.call_handlers(&response, qname, qtype, &matched, zone);
        if !custom.is_empty() {
            tracing::trace!("got handler answer");
            response.header.is_authoritative = true;
            response.answers.extend(custom);
            return response;
        }

        tracing::trace!("got no-data answer");
        response.header.is_authoritative = true;
        response.header.rcode = Rcode::NoError;
        response.authority.extend(zone.authority().to_vec());
        response
    }

    /// The query name exists with records of the asked-for type.
    fn resolve_exact_type_match(
        &self,
        mut response: Message,
        qname: &DomainName,
        qtype: QueryType,
        type_matches: Vec<ResourceRecord>,
        matched: &[ResourceRecord],
        zone: &Arc<Zone>,
    ) -> Message {
        if qtype == QueryType::Record(RecordType::NS) {
            let is_soa = match_type(RecordType::SOA);
            if matched.iter().any(|rr| is_soa(rr)) {
                tracing::trace!("got apex NS answer");
                response.header.is_authoritative = true;
                response.answers.extend(type_matches);
                return response;
            }

            // NS at a name without a SOA is a delegation point, so
            // the answer is a referral, not authoritative data
            tracing::trace!("got NS referral");
            response.header.is_authoritative = false;
            response.authority.extend(type_matches);
            return response;
        }

        if qtype == QueryType::Record(RecordType::DNSKEY) && qname == zone.name() {
            self.events.notify(ResolveEvent::DnssecRequest {
                qname: qname.clone(),
                qtype,
            });
            let keys = self.signer.dnskey_rrset(&response, zone);
            if !keys.is_empty() {
                tracing::trace!("got signer DNSKEY answer");
                response.header.is_authoritative = true;
                response.answers.extend(keys);
                return response;
            }
        }

        // glue at a delegation point is not authoritative data: the
        // delegation wins
        let delegations = self.cache.get_delegations(qname);
        if !delegations.is_empty() {
            tracing::trace!("got referral for glue owner");
            response.header.is_authoritative = false;
            response.authority.extend(delegations);
            return response;
        }

        tracing::trace!("got exact type answer");
        response.header.is_authoritative = true;
        response.answers.extend(type_matches);
        response
    }

    /// The query name has no records of its own: look for the
    /// closest wildcard or ancestor match.
    fn resolve_best_match(
        &self,
        mut response: Message,
        qname: &DomainName,
        qtype: QueryType,
        zone: &Arc<Zone>,
        question: &Question,
        chain: &mut Vec<ResourceRecord>,
    ) -> Message {
        let best = self.best_match_records(qname);

        let is_ns = match_type(RecordType::NS);
        let is_soa = match_type(RecordType::SOA);
        let ns_rrs: Vec<ResourceRecord> = best.iter().filter(|rr| is_ns(rr)).cloned().collect();
        let has_soa = best.iter().any(|rr| is_soa(rr));

        if !ns_rrs.is_empty() && !has_soa {
            tracing::trace!("got referral from ancestor");
            response.header.is_authoritative = false;
            response.authority.extend(ns_rrs);
            return response;
        }

        if best.iter().any(|rr| match_wildcard()(rr)) {
            return self.resolve_wildcard_match(response, qname, qtype, best, zone, question, chain);
        }

        if *qname == question.name {
            tracing::trace!("got name error");
            response.header.rcode = Rcode::NameError;
            response.header.is_authoritative = true;
            response.authority.extend(zone.authority().to_vec());
            return response;
        }

        // dead end at the tail of a CNAME chain: nothing below here
        // is ours to answer
        tracing::trace!("got dead end after CNAME");
        if self.config.serve_root_hints {
            let (ns_rrs, glue_rrs) = root_hints();
            response.authority.extend(ns_rrs);
            response.additional.extend(glue_rrs);
        }
        response
    }

    /// A wildcard owner covers the query name.  Expand it and answer
    /// as if the records were exact.
    #[allow(clippy::too_many_arguments)]
    fn resolve_wildcard_match(
        &self,
        mut response: Message,
        qname: &DomainName,
        qtype: QueryType,
        best: Vec<ResourceRecord>,
        zone: &Arc<Zone>,
        question: &Question,
        chain: &mut Vec<ResourceRecord>,
    ) -> Message {
        let expanded: Vec<ResourceRecord> = best
            .iter()
            .map(|rr| {
                let mut rr = rr.clone();
                rr.name = wildcard_substitution(&rr.name, qname);
                rr
            })
            .collect();

        let is_cname = match_type(RecordType::CNAME);
        let cname_rrs: Vec<ResourceRecord> =
            expanded.iter().filter(|rr| is_cname(rr)).cloned().collect();

        if !cname_rrs.is_empty() {
            if qtype == QueryType::Record(RecordType::CNAME) {
                tracing::trace!("got wildcard CNAME answer");
                response.header.is_authoritative = true;
                response.answers.extend(cname_rrs);
                return response;
            }
            return self.chase_cname(response, qtype, cname_rrs, zone, question, chain);
        }

        let type_matches = self.filter_by_qtype(qtype, &expanded);
        if !type_matches.is_empty() {
            tracing::trace!("got wildcard answer");
            response.header.is_authoritative = true;
            response.answers.extend(type_matches);
            return response;
        }

        let custom = self.call_handlers(&response, qname, qtype, &expanded, zone);
        if !custom.is_empty() {
            tracing::trace!("got wildcard handler answer");
            response.header.is_authoritative = true;
            response.answers.extend(custom);
            return response;
        }

        tracing::trace!("got wildcard no-data answer");
        response.header.is_authoritative = true;
        response.header.rcode = Rcode::NoError;
        response.authority.extend(zone.authority().to_vec());
        response
    }

    /// Answer with the alias, then restart resolution at its target,
    /// which may sit in this zone, another local zone, or outside
    /// our authority entirely.  A repeated alias or an over-long
    /// chain is a server failure.
    fn chase_cname(
        &self,
        mut response: Message,
        qtype: QueryType,
        cname_rrs: Vec<ResourceRecord>,
        zone: &Arc<Zone>,
        question: &Question,
        chain: &mut Vec<ResourceRecord>,
    ) -> Message {
        let Some(last) = cname_rrs.last().cloned() else {
            return response;
        };

        if chain.contains(&last) || chain.len() + cname_rrs.len() > self.config.cname_chain_limit {
            tracing::debug!("CNAME loop or chain overflow");
            response.header.rcode = Rcode::ServerFailure;
            response.header.is_authoritative = true;
            return response;
        }

        response.header.is_authoritative = true;
        response.answers.extend(cname_rrs.iter().cloned());
        chain.extend(cname_rrs);

        let RecordData::CNAME { cname: target } = last.data else {
            return response;
        };
        tracing::trace!(%target, "chasing CNAME");

        if self.cache.record_name_in_zone(zone.name(), &target) {
            return self.resolve_in_zone(response, &target, qtype, zone, question, chain);
        }
        if self.cache.in_zone(&target) {
            if let Ok(other_zone) = self.cache.find_zone(&target, None) {
                return self.resolve_in_zone(response, &target, qtype, &other_zone, question, chain);
            }
        }

        // the target is out of bailiwick; the alias is all we can say
        tracing::trace!("CNAME target out of bailiwick");
        response
    }

    /// Walk from the query name toward the root.  At each depth a
    /// wildcard owner beats the plain ancestor name; the first
    /// non-empty record set wins.
    fn best_match_records(&self, qname: &DomainName) -> Vec<ResourceRecord> {
        for depth in 1..qname.labels.len() {
            let suffix = qname.labels[depth..].to_vec();

            let mut wildcard_labels = Vec::with_capacity(suffix.len() + 1);
            wildcard_labels.push(Label::wildcard());
            wildcard_labels.extend(suffix.iter().cloned());
            if let Some(wildcard) = DomainName::from_labels(wildcard_labels) {
                let rrs = self.cache.get_records_by_name(&wildcard);
                if !rrs.is_empty() {
                    return rrs;
                }
            }

            if let Some(ancestor) = DomainName::from_labels(suffix) {
                let rrs = self.cache.get_records_by_name(&ancestor);
                if !rrs.is_empty() {
                    return rrs;
                }
            }
        }

        Vec::new()
    }

    /// Find the closest delegation boundary strictly between the
    /// query name and the apex, if there is one.
    fn detect_zonecut(&self, zone: &Zone, qname: &DomainName) -> Vec<ResourceRecord> {
        let apex_len = zone.name().labels.len();
        if qname.labels.len() <= apex_len {
            return Vec::new();
        }

        for depth in 1..qname.labels.len() - apex_len {
            let Some(ancestor) = DomainName::from_labels(qname.labels[depth..].to_vec()) else {
                continue;
            };
            let ns_rrs = self.cache.get_delegations(&ancestor);
            if !ns_rrs.is_empty() {
                return ns_rrs;
            }
        }

        Vec::new()
    }

    fn filter_by_qtype(&self, qtype: QueryType, records: &[ResourceRecord]) -> Vec<ResourceRecord> {
        match qtype {
            QueryType::Any => self.handlers.filter_any(records.to_vec()),
            QueryType::Record(rtype) => {
                let wanted = match_type(rtype);
                records.iter().filter(|rr| wanted(rr)).cloned().collect()
            }
            // zone transfers and the obsolete mail qtypes are not
            // served from here
            _ => Vec::new(),
        }
    }

    /// Let registered handlers answer, then give the signer a chance
    /// to sign each produced RRset.
    fn call_handlers(
        &self,
        response: &Message,
        qname: &DomainName,
        qtype: QueryType,
        matched: &[ResourceRecord],
        zone: &Arc<Zone>,
    ) -> Vec<ResourceRecord> {
        let rrs = self.handlers.call(qname, qtype, matched, response);
        if rrs.is_empty() {
            return rrs;
        }

        let mut signed = Vec::with_capacity(rrs.len());
        for rrset in records_to_rrsets(rrs) {
            signed.extend(self.signer.maybe_sign_rrset(response, rrset, zone));
        }
        signed
    }
}

#[cfg(test)]
mod tests {
    use dns_types::protocol::types::test_util::*;
    use dns_types::zones::types::{Zone, Zones};
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use super::*;
    use crate::handler::{HandlerError, HandlerVersion, RecordHandler};

    const SOA_MINIMUM: u32 = 1800;

    fn zones() -> Zones {
        let mut com_records = vec![
            soa_record("example.com.", SOA_MINIMUM),
            ns_record("example.com.", "ns1.example.com."),
            a_record("ns1.example.com.", Ipv4Addr::new(3, 3, 3, 3)),
            dnskey_record("example.com.", b"zsk"),
            a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4)),
            txt_record("www.example.com.", b"hello"),
            mx_record("example.com.", 10, "mail.example.com."),
            a_record("mail.example.com.", Ipv4Addr::new(1, 1, 1, 1)),
            ns_record("sub.example.com.", "ns1.sub.example.com."),
            a_record("ns1.sub.example.com.", Ipv4Addr::new(9, 9, 9, 9)),
            a_record("handled.example.com.", Ipv4Addr::new(7, 7, 7, 7)),
            cname_record("a.example.com.", "b.example.com."),
            cname_record("b.example.com.", "a.example.com."),
            cname_record("cname-www.example.com.", "www.example.com."),
            cname_record("cname-out.example.com.", "www.example.net."),
            cname_record("cname-org.example.com.", "target.example.org."),
            cname_record("cname-to-sub.example.com.", "host.sub.example.com."),
            cname_record("dead.example.com.", "gone.example.com."),
        ];
        for i in 0..10 {
            com_records.push(cname_record(
                &format!("c{i}.chain.example.com."),
                &format!("c{}.chain.example.com.", i + 1),
            ));
        }

        let org_records = vec![
            soa_record("example.org.", 300),
            cname_record("*.example.org.", "target.example.org."),
            a_record("target.example.org.", Ipv4Addr::new(5, 6, 7, 8)),
        ];

        let mut zones = Zones::new();
        zones.insert(Zone::new(domain("example.com."), com_records));
        zones.insert(Zone::new(domain("example.org."), org_records));
        zones
    }

    fn resolver() -> Resolver<Zones> {
        Resolver::new(zones()).with_config(ResolverConfig {
            serve_root_hints: false,
            cname_chain_limit: 8,
        })
    }

    fn client() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn query(name: &str, qtype: QueryType) -> Message {
        Message::from_question(
            1234,
            Question {
                name: domain(name),
                qtype,
                qclass: QueryClass::Record(RecordClass::IN),
            },
        )
    }

    fn resolve(resolver: &Resolver<Zones>, name: &str, qtype: QueryType) -> Message {
        resolver.resolve(query(name, qtype), &[], client())
    }

    fn clamped_soa() -> ResourceRecord {
        minimum_soa_ttl_record("example.com.", SOA_MINIMUM)
    }

    fn minimum_soa_ttl_record(name: &str, minimum: u32) -> ResourceRecord {
        let mut rr = soa_record(name, minimum);
        rr.ttl = std::cmp::min(rr.ttl, minimum);
        rr
    }

    #[test]
    fn exact_a_answer() {
        let response = resolve(&resolver(), "www.example.com.", QueryType::Record(RecordType::A));

        assert!(response.header.is_response);
        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert_eq!(
            vec![a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4))],
            response.answers
        );
        assert!(response.authority.is_empty());
        assert!(response.additional.is_empty());
    }

    #[test]
    fn exact_answer_echoes_edns() {
        let mut request = query("www.example.com.", QueryType::Record(RecordType::A));
        request.edns = Some(Edns {
            udp_payload_size: 4096,
            extended_rcode: 0,
            version: 0,
            dnssec_ok: true,
            options: Vec::new(),
        });

        let response = resolver().resolve(request.clone(), &[], client());

        assert_eq!(request.edns, response.edns);
    }

    #[test]
    fn nxdomain_with_clamped_soa() {
        let response = resolve(&resolver(), "nope.example.com.", QueryType::Record(RecordType::A));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NameError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert_eq!(vec![clamped_soa()], response.authority);
        assert_eq!(SOA_MINIMUM, response.authority[0].ttl);
    }

    #[test]
    fn wildcard_cname_chase() {
        let response = resolve(
            &resolver(),
            "anything.example.org.",
            QueryType::Record(RecordType::A),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert_eq!(
            vec![
                cname_record("anything.example.org.", "target.example.org."),
                a_record("target.example.org.", Ipv4Addr::new(5, 6, 7, 8)),
            ],
            response.answers
        );
    }

    #[test]
    fn wildcard_never_escapes_into_answers() {
        for name in [
            "a.example.org.",
            "b.example.org.",
            "deep.under.example.org.",
        ] {
            let response = resolve(&resolver(), name, QueryType::Record(RecordType::A));
            assert!(!response.answers.is_empty(), "no answers for {name}");
            for rr in &response.answers {
                assert!(!rr.name.is_wildcard(), "wildcard owner leaked for {name}");
            }
        }
    }

    #[test]
    fn cname_loop_is_servfail() {
        let response = resolve(&resolver(), "a.example.com.", QueryType::Record(RecordType::A));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::ServerFailure, response.header.rcode);
        assert_eq!(2, response.answers.len());
    }

    #[test]
    fn cname_chain_overflow_is_servfail() {
        let response = resolve(
            &resolver(),
            "c0.chain.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::ServerFailure, response.header.rcode);
    }

    #[test]
    fn delegation_referral_with_glue() {
        let response = resolve(
            &resolver(),
            "host.sub.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(!response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert_eq!(
            vec![ns_record("sub.example.com.", "ns1.sub.example.com.")],
            response.authority
        );
        assert_eq!(
            vec![a_record("ns1.sub.example.com.", Ipv4Addr::new(9, 9, 9, 9))],
            response.additional
        );
    }

    #[test]
    fn mx_answer_gets_additional_glue() {
        let response = resolve(&resolver(), "example.com.", QueryType::Record(RecordType::MX));

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![mx_record("example.com.", 10, "mail.example.com.")],
            response.answers
        );
        assert_eq!(
            vec![a_record("mail.example.com.", Ipv4Addr::new(1, 1, 1, 1))],
            response.additional
        );
    }

    #[test]
    fn root_hints_for_unhosted_name() {
        let resolver = Resolver::new(zones()).with_config(ResolverConfig {
            serve_root_hints: true,
            cname_chain_limit: 8,
        });
        let response = resolve(&resolver, "com.", QueryType::Record(RecordType::NS));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert_eq!(13, response.authority.len());
        assert_eq!(13, response.additional.len());
        for rr in &response.authority {
            assert_eq!(RecordType::NS, rr.rtype());
            assert!(rr.name.is_root());
        }
        for rr in &response.additional {
            assert_eq!(RecordType::A, rr.rtype());
        }
    }

    #[test]
    fn unhosted_name_without_hints_is_bare_noerror() {
        let response = resolve(&resolver(), "com.", QueryType::Record(RecordType::NS));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert!(response.authority.is_empty());
        assert!(response.additional.is_empty());
    }

    #[test]
    fn ns_at_apex_is_authoritative_answer() {
        let response = resolve(&resolver(), "example.com.", QueryType::Record(RecordType::NS));

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![ns_record("example.com.", "ns1.example.com.")],
            response.answers
        );
        assert_eq!(
            vec![a_record("ns1.example.com.", Ipv4Addr::new(3, 3, 3, 3))],
            response.additional
        );
    }

    #[test]
    fn ns_below_apex_is_referral() {
        let response = resolve(&resolver(), "sub.example.com.", QueryType::Record(RecordType::NS));

        assert!(!response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert_eq!(
            vec![ns_record("sub.example.com.", "ns1.sub.example.com.")],
            response.authority
        );
    }

    #[test]
    fn glue_owner_answers_as_referral() {
        let response = resolve(
            &resolver(),
            "ns1.sub.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(!response.header.is_authoritative);
        assert_eq!(
            vec![ns_record("sub.example.com.", "ns1.sub.example.com.")],
            response.authority
        );
    }

    #[test]
    fn no_data_has_soa_authority() {
        let response = resolve(&resolver(), "www.example.com.", QueryType::Record(RecordType::MX));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert!(response.answers.is_empty());
        assert_eq!(vec![clamped_soa()], response.authority);
    }

    #[test]
    fn any_query_returns_all_types() {
        let mut response = resolve(&resolver(), "www.example.com.", QueryType::Any);

        assert!(response.header.is_authoritative);
        response.answers.sort();
        assert_eq!(
            vec![
                a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4)),
                txt_record("www.example.com.", b"hello"),
            ],
            response.answers
        );
    }

    #[test]
    fn cname_chased_within_zone() {
        let response = resolve(
            &resolver(),
            "cname-www.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![
                cname_record("cname-www.example.com.", "www.example.com."),
                a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4)),
            ],
            response.answers
        );
    }

    #[test]
    fn cname_query_answers_alias_only() {
        let response = resolve(
            &resolver(),
            "cname-www.example.com.",
            QueryType::Record(RecordType::CNAME),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![cname_record("cname-www.example.com.", "www.example.com.")],
            response.answers
        );
    }

    #[test]
    fn cname_chased_across_local_zones() {
        let response = resolve(
            &resolver(),
            "cname-org.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![
                cname_record("cname-org.example.com.", "target.example.org."),
                a_record("target.example.org.", Ipv4Addr::new(5, 6, 7, 8)),
            ],
            response.answers
        );
    }

    #[test]
    fn cname_out_of_bailiwick_stops_at_alias() {
        let response = resolve(
            &resolver(),
            "cname-out.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert_eq!(
            vec![cname_record("cname-out.example.com.", "www.example.net.")],
            response.answers
        );
        assert!(response.authority.is_empty());
    }

    #[test]
    fn cname_into_delegation_is_referral() {
        let response = resolve(
            &resolver(),
            "cname-to-sub.example.com.",
            QueryType::Record(RecordType::A),
        );

        assert!(!response.header.is_authoritative);
        assert_eq!(
            vec![cname_record("cname-to-sub.example.com.", "host.sub.example.com.")],
            response.answers
        );
        assert_eq!(
            vec![ns_record("sub.example.com.", "ns1.sub.example.com.")],
            response.authority
        );
    }

    #[test]
    fn cname_dead_end_keeps_alias() {
        let response = resolve(&resolver(), "dead.example.com.", QueryType::Record(RecordType::A));

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NoError, response.header.rcode);
        assert_eq!(
            vec![cname_record("dead.example.com.", "gone.example.com.")],
            response.answers
        );
        assert!(response.authority.is_empty());
    }

    #[test]
    fn rrsig_query_is_refused() {
        let response = resolve(&resolver(), "www.example.com.", QueryType::Record(RecordType::RRSIG));

        assert!(!response.header.is_authoritative);
        assert!(!response.header.authentic_data);
        assert!(!response.header.checking_disabled);
        assert_eq!(Rcode::Refused, response.header.rcode);
        assert!(response.answers.is_empty());
    }

    #[test]
    fn message_without_question_is_unchanged() {
        let mut request = query("www.example.com.", QueryType::Record(RecordType::A));
        request.questions.clear();

        let response = resolver().resolve(request.clone(), &[], client());

        assert_eq!(request, response);
    }

    #[test]
    fn extra_questions_are_discarded() {
        let mut request = query("www.example.com.", QueryType::Record(RecordType::A));
        request.questions.push(Question {
            name: domain("mail.example.com."),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        });

        let response = resolver().resolve(request, &[], client());

        assert_eq!(1, response.questions.len());
        assert_eq!(domain("www.example.com."), response.questions[0].name);
        assert_eq!(
            vec![a_record("www.example.com.", Ipv4Addr::new(1, 2, 3, 4))],
            response.answers
        );
    }

    #[test]
    fn authority_hint_anchors_zone_search() {
        let hints = vec![soa_record("example.com.", SOA_MINIMUM)];
        let response = resolver().resolve(
            query("www.example.net.", QueryType::Record(RecordType::A)),
            &hints,
            client(),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(Rcode::NameError, response.header.rcode);
        assert_eq!(vec![clamped_soa()], response.authority);
    }

    #[test]
    fn dnskey_at_apex_served_from_zone() {
        let response = resolve(&resolver(), "example.com.", QueryType::Record(RecordType::DNSKEY));

        assert!(response.header.is_authoritative);
        assert_eq!(vec![dnskey_record("example.com.", b"zsk")], response.answers);
    }

    struct KeyedSigner;

    impl DnssecSigner for KeyedSigner {
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
            vec![dnskey_record("example.com.", b"signer-key")]
        }
    }

    #[test]
    fn dnskey_at_apex_prefers_signer() {
        let resolver = resolver().with_signer(Box::new(KeyedSigner));
        let response = resolve(&resolver, "example.com.", QueryType::Record(RecordType::DNSKEY));

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![dnskey_record("example.com.", b"signer-key")],
            response.answers
        );
    }

    struct SynthTxtHandler;

    impl RecordHandler for SynthTxtHandler {
        fn id(&self) -> &str {
            "synth-txt"
        }

        fn types(&self) -> &[RecordType] {
            &[RecordType::TXT]
        }

        fn version(&self) -> HandlerVersion {
            HandlerVersion::V2
        }

        fn handle(
            &self,
            qname: &DomainName,
            _qtype: QueryType,
            _matched: &[ResourceRecord],
        ) -> Result<Vec<ResourceRecord>, HandlerError> {
            if *qname == domain("handled.example.com.") {
                Ok(vec![txt_record("handled.example.com.", b"synthesised")])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn handler_answers_unmatched_type() {
        let mut handlers = HandlerRegistry::new();
        handlers.register(std::sync::Arc::new(SynthTxtHandler));
        let resolver = resolver().with_handlers(handlers);

        let response = resolve(
            &resolver,
            "handled.example.com.",
            QueryType::Record(RecordType::TXT),
        );

        assert!(response.header.is_authoritative);
        assert_eq!(
            vec![txt_record("handled.example.com.", b"synthesised")],
            response.answers
        );
        assert!(response.authority.is_empty());
    }

    #[derive(Clone, Default)]
    struct CollectingSink {
        events: std::sync::Arc<Mutex<Vec<ResolveEvent>>>,
    }

    impl EventSink for CollectingSink {
        fn notify(&self, event: ResolveEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn events_fire_around_resolution() {
        let sink = CollectingSink::default();
        let resolver = resolver().with_events(Box::new(sink.clone()));

        resolve(&resolver, "www.example.com.", QueryType::Record(RecordType::A));

        let events = sink.events.lock().unwrap();
        assert_eq!(
            vec![
                ResolveEvent::Start {
                    qname: domain("www.example.com."),
                    qtype: QueryType::Record(RecordType::A),
                    client: client(),
                },
                ResolveEvent::Complete {
                    qname: domain("www.example.com."),
                    qtype: QueryType::Record(RecordType::A),
                    rcode: Rcode::NoError,
                    client: client(),
                },
            ],
            *events
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let resolver = resolver();
        for (name, qtype) in [
            ("www.example.com.", QueryType::Record(RecordType::A)),
            ("anything.example.org.", QueryType::Record(RecordType::A)),
            ("nope.example.com.", QueryType::Record(RecordType::A)),
            ("example.com.", QueryType::Record(RecordType::MX)),
            ("www.example.com.", QueryType::Any),
        ] {
            let first = resolve(&resolver, name, qtype);
            let second = resolve(&resolver, name, qtype);
            assert_eq!(first, second, "non-deterministic response for {name}");
        }
    }

    #[test]
    fn nonauthoritative_noerror_authority_shape() {
        // referral responses carry NS and never SOA
        for name in ["host.sub.example.com.", "sub.example.com."] {
            let response = resolve(&resolver(), name, QueryType::Record(RecordType::NS));
            if !response.header.is_authoritative && response.header.rcode == Rcode::NoError {
                assert!(!response.authority.is_empty());
                for rr in &response.authority {
                    assert_eq!(RecordType::NS, rr.rtype());
                }
            }
        }
    }
}
