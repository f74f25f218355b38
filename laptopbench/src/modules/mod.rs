pub mod ivory;
pub mod notebookcheck;
