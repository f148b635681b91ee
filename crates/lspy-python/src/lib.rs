mod command;
mod deps;
mod platform;
mod resolve;
mod roots;
pub mod system;
mod venv;

pub use command::display_command;
pub use command::CommandError;
pub use command::CommandRunner;
pub use command::SystemCommandRunner;
pub use deps::compose_dependency_paths;
pub use platform::ParseVersionError;
pub use platform::Platform;
pub use platform::PythonVersion;
pub use resolve::Resolver;
pub use resolve::WorkspaceFolder;
pub use roots::ProjectRoots;
pub use roots::ROOT_MARKERS;
pub use system::FileSystem;
pub use system::OsFileSystem;
pub use venv::interpreter_in_venv;
pub use venv::PostProcess;
pub use venv::VenvRule;
pub use venv::VENV_RULES;
