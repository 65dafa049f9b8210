use std::fmt;
use std::sync::Arc;

use dns_types::protocol::types::*;

/// Which calling convention a handler follows.  V2 handlers get the
/// whole query message alongside the matched records.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HandlerVersion {
    V1,
    V2,
}

/// A handler failed.  The resolver logs this and carries on as if
/// the handler had returned nothing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HandlerError(pub String);

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "handler failed: {}", self.0)
    }
}

impl std::error::Error for HandlerError {}

/// A pluggable answer source for record types the stock resolution
/// does not synthesise itself.
///
/// A handler runs when the query type is one of its registered types,
/// or on an ANY query.  Its `filter` is applied to candidate ANY
/// answers whether or not the handler itself produced them.
pub trait RecordHandler: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// The record types this handler answers for.
    fn types(&self) -> &[RecordType];

    fn version(&self) -> HandlerVersion {
        HandlerVersion::V1
    }

    /// V1 calling convention.
    fn handle(
        &self,
        qname: &DomainName,
        qtype: QueryType,
        matched: &[ResourceRecord],
    ) -> Result<Vec<ResourceRecord>, HandlerError>;

    /// V2 calling convention; defaults to V1 behaviour.
    fn handle_with_message(
        &self,
        qname: &DomainName,
        qtype: QueryType,
        matched: &[ResourceRecord],
        _message: &Message,
    ) -> Result<Vec<ResourceRecord>, HandlerError> {
        self.handle(qname, qtype, matched)
    }

    /// Filter applied to the record set of an ANY answer.
    fn filter(&self, records: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
        records
    }
}

/// The set of registered handlers, dispatched in registration order.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn RecordHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.handlers.iter().map(|h| h.id()).collect();
        f.debug_struct("HandlerRegistry").field("handlers", &ids).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn register(&mut self, handler: Arc<dyn RecordHandler>) {
        self.handlers.push(handler);
    }

    /// Run every handler applicable to the query, concatenating their
    /// answers.  A failing handler contributes nothing.
    pub fn call(
        &self,
        qname: &DomainName,
        qtype: QueryType,
        matched: &[ResourceRecord],
        message: &Message,
    ) -> Vec<ResourceRecord> {
        let mut out = Vec::new();

        for handler in &self.handlers {
            let applies = qtype == QueryType::Any
                || matches!(qtype, QueryType::Record(rtype) if handler.types().contains(&rtype));
            if !applies {
                continue;
            }

            let result = match handler.version() {
                HandlerVersion::V1 => handler.handle(qname, qtype, matched),
                HandlerVersion::V2 => handler.handle_with_message(qname, qtype, matched, message),
            };

            match result {
                Ok(mut rrs) => out.append(&mut rrs),
                Err(error) => {
                    tracing::warn!(handler = handler.id(), %error, "handler failed");
                }
            }
        }

        out
    }

    /// Run every handler's ANY filter over a record set.
    pub fn filter_any(&self, records: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
        self.handlers
            .iter()
            .fold(records, |rrs, handler| handler.filter(rrs))
    }
}
