pub mod extract;
pub mod password;
pub mod rate_limit;
pub mod token;
pub mod validate;
