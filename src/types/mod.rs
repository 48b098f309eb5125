//! Core types for the social graph kernel.

pub mod user;
pub mod friendship;
pub mod results;

pub use user::{UserId, User, normalize_name};
pub use friendship::Friendship;
pub use results::{
    Recommendation, Influencer, GraphNode, GraphEdge, GraphExport, GraphStatistics,
};
