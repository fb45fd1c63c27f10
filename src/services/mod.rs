pub mod commission_service;
pub mod order_service;
pub mod order_status_service;
pub mod status_calculator;

pub use commission_service::*;
pub use order_service::*;
pub use order_status_service::*;
pub use status_calculator::*;
