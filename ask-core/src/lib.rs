// ask-core/src/lib.rs
pub mod install;
pub mod metadata;
pub mod process;
pub mod request;
pub mod teardown;

#[cfg(all(test, unix))]
mod test_support;

pub use install::{start_install, InstallLauncher, MonitorReport, MonitorTimings};
pub use metadata::fetch_metadata;
pub use request::InstallRequest;
pub use teardown::{spawn_signal_listener, Teardown};
