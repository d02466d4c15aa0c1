pub mod panels;
pub mod plan;
pub mod plot;
pub mod table;
