//! Linear issue-store integration: GraphQL transport, relation queries and
//! the fail-closed dependency gate.

pub mod client;
pub mod error;
pub mod gate;
pub mod transport;

pub mod mock;

pub use client::{IssueRelation, IssueState, LinearClient, RelatedIssue};
pub use error::LinearError;
pub use gate::{DependencyGate, GateVerdict, LinearDependencyGate};
pub use transport::{GraphqlRequest, GraphqlTransport, ReqwestGraphqlTransport};
