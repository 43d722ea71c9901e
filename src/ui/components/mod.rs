mod command_input;
mod confirm;
mod input;
mod key_result;
mod picker;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::ConfirmDialog;
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use picker::{Picker, PickerEvent};
pub use search_input::{SearchEvent, SearchInput};
