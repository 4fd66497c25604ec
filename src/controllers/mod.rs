// History viewer list controllers
// Each controller owns the page state of one view and talks to the remote data service.

pub mod grouping;
pub mod history_controller;
pub mod pagination;
pub mod screenshot_controller;
