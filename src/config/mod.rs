//! Configuration: runtime settings, the optional XML file and path checks.
//! CLI flags are layered on top in `cli::Args::apply_overrides`.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{CONFIG_ENV, default_config_path, path_has_symlink_ancestor, resolve_config_path};
pub use types::{Config, LogLevel};
pub use xml::{load_config, load_config_from_xml_path};
