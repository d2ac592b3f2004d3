pub mod corpus;
pub mod server;
