pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskChanges};
pub use user::{NewUser, User};
