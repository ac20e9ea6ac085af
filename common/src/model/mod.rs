pub mod block;
pub mod csv;
pub mod datasource;
pub mod editor;
pub mod place_holder;
pub mod publish;
pub mod render;
pub mod sanitize;
pub mod table;
pub mod template;
pub mod token;
pub mod variable;
