//! # Request Handlers
//!
//! Single-call entry points for runtimes that pass in an event and expect
//! a JSON-serialisable result: certificate issuance for a service and the
//! scheduler ACL bootstrap. Both return [`crate::Result`] and leave exit
//! codes to the caller.

pub mod acl;
pub mod issue;

pub use acl::{bootstrap_acl, AclBootstrapReport};
pub use issue::{AuthorityFactory, CertificateRequestEvent, CertificateRequestHandler};
