//! Screen implementations for the shell's terminal front end.

mod alert;
mod api_key;
mod input;
mod loading;
mod memory_match;
mod quiz_show;
mod settings;

pub use alert::AlertScreen;
pub use api_key::ApiKeyScreen;
pub use input::InputScreen;
pub use loading::LoadingScreen;
pub use memory_match::MemoryMatchScreen;
pub use quiz_show::QuizShowScreen;
pub use settings::SettingsScreen;
