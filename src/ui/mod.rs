pub mod cards;
pub mod panels;
pub mod plot;
pub mod table;
