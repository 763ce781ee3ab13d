use crate::id::{ComponentId, NetId, PortId};
use thiserror::Error;

/// Contract violations in the routing graph. Each of these means the view
/// model and the graph have desynchronized, so they surface immediately
/// instead of being papered over.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("obstacle {0} is already registered")]
    DuplicateNode(ComponentId),
    #[error("port {0} is already registered")]
    DuplicatePort(PortId),
    #[error("edge {0} is already registered")]
    DuplicateEdge(NetId),
    #[error("unknown obstacle {0}")]
    UnknownNode(ComponentId),
    #[error("unknown port {0}")]
    UnknownPort(PortId),
    #[error("unknown edge {0}")]
    UnknownEdge(NetId),
    #[error("port {port} is not attached to obstacle {owner}")]
    PortOwnerMismatch { port: PortId, owner: ComponentId },
}
