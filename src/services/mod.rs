pub mod ai;
pub mod crisis;
pub mod dispatcher;
pub mod feedback;
pub mod helplines;
pub mod prompt;
pub mod resources;
pub mod search;
