pub mod canvas_ops;
pub mod color;
pub mod compose;
pub mod layout;
pub mod text;
