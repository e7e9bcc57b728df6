pub mod bracket;
