pub mod alias;
pub mod form;
pub mod question;
pub mod submit;
