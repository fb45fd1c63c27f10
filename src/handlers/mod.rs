pub mod admin;
pub mod order;
pub mod part;

pub use admin::admin_config;
pub use order::order_config;
pub use part::part_config;
