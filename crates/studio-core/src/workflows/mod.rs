//! Workflow modules for the studio.
//!
//! Every action runs the same pipeline: check the session, invoke the agent,
//! persist the result, then apply the outcome to the session. A failure at
//! any step returns before the store or the session is touched.
//!
//! - `research`: idea to research brief, plus manual brief edits
//! - `write`: brief and feedback to script
//! - `review`: editorial verdict and send-back
//! - `storyboard`: approved script to storyboard markdown
//! - `export`: final script to a text file

pub mod export;
pub mod research;
pub mod review;
pub mod storyboard;
pub mod write;

// Re-export workflow functions
pub use export::export_script;
pub use research::{edit_research_brief, run_research};
pub use review::{run_review, send_back};
pub use storyboard::generate_storyboard;
pub use write::write_script;

