//! Pages: login, registration and the paginated to-do list.

pub mod login;
pub mod register;
pub mod todos;

pub use login::LoginPage;
pub use register::RegisterPage;
pub use todos::{TodosPage, TodosView};
