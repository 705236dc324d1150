// Shared test infrastructure: a real actix-web test server wired to a real
// test database, a local stand-in for the bank simulator (an external
// collaborator), small HTTP client/assertion helpers, and fixtures for
// building CARD payment requests.

pub mod bank_simulator;
pub mod test_client;
pub mod test_data;
pub mod test_database;
pub mod test_server;

pub use assertions::*;
pub use bank_simulator::*;
pub use test_client::*;
pub use test_data::*;
pub use test_database::*;
pub use test_server::*;
