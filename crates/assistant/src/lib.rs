pub mod app;
pub mod cli;
pub mod console;
pub mod router;

pub use router::{Clock, Collaborators, Router, RouterSettings, SystemClock};
