pub mod form;
pub mod question;
pub mod response;
pub mod user;
