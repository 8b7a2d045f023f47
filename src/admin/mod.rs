//! Write-side operations behind the `admin` subcommands.

pub mod actions;
pub mod forms;

pub use forms::{ContactForm, EventForm, NewsForm, SlotPatch};
