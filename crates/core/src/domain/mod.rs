pub mod cart;
pub mod insight;
pub mod order;
pub mod product;
