pub mod order_number;
pub mod pagination;

pub use order_number::generate_order_number;
pub use pagination::PaginationParams;
