pub mod bracket_layout;
pub mod layout;
