pub mod app;
pub mod list;

pub use app::App;
