mod list;
mod root;
mod show;

pub use list::ListCommand;
pub use root::Cli;
pub use show::ShowCommand;
