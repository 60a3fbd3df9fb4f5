pub mod dashboard;
pub mod login;
pub mod user_form;
pub mod users;
