// History viewer shared type definitions
// Each submodule defines types used by the services, controllers and shell.

pub mod errors;
pub mod history;
pub mod page;
pub mod screenshot;
pub mod settings;
pub mod view;
