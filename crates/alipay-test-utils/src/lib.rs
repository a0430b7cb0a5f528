pub mod fixtures;
pub mod helpers;
pub mod mock_refund;
pub mod mock_transport;

pub use helpers::*;
pub use mock_refund::{RecordedRefund, RecordingRefund};
pub use mock_transport::MockTransport;
