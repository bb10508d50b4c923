/// Direct and triangular opportunity records
pub mod opportunity;
/// Tokens and token pairs
pub mod token;
/// Trading venues and the networks they live on
pub mod venue;

pub use opportunity::{DirectOpportunity, TriangularOpportunity};
pub use token::{Token, TokenPair};
pub use venue::{Network, Venue};
