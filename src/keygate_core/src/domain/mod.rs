pub mod email;
pub mod one_time_code;
pub mod password;
pub mod reset_request;
pub mod user;
