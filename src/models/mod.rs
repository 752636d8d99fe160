pub mod board;
pub mod list;
pub mod task;
pub mod user;

pub use board::{Board, BoardInput};
pub use list::{BoardList, ListInput};
pub use task::{Task, TaskInput};
pub use user::{NewUserRequest, UpdateUserRequest, User};

/// Longest name a list or task may carry; longer names are cut, not rejected.
pub const MAX_NAME_CHARS: usize = 100;

/// Cuts `value` to at most `max_chars` characters, on a character boundary.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}
