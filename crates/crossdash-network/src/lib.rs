//! Actor-network aggregation for Crossdash
//!
//! Turns a list of actor/target interactions into a weighted node/edge
//! graph ready for a force-layout renderer. Layout itself is left to the
//! renderer.

pub mod aggregate;
pub mod common;
pub mod community;

pub use aggregate::{build_network, node_size, ActorNetwork, NetworkConfig, NetworkEdge, NetworkNode};
pub use common::{GraphView, Identity, Interaction};
pub use community::{weakly_connected_components, WccResult};
