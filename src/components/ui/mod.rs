pub mod button;
pub mod card;
pub mod input;
pub mod spinner;
pub mod table;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use button::*;
#[allow(unused_imports)]
pub use card::*;
pub use input::*;
pub use spinner::*;
#[allow(unused_imports)]
pub use table::*;
