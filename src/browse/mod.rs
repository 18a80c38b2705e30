//! Interactive setlist view

mod interactive;

pub use interactive::run_setlist_view;
