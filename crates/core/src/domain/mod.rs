pub mod price;
pub mod recommendation;
pub mod sentiment;
