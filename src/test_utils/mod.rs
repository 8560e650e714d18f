//! Helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

pub mod mock_connector;
pub mod shared_buf;

pub use mock_connector::MockConnector;
pub use shared_buf::SharedBuf;
