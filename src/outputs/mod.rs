//! Output generation for the rendered dashboard page.
//!
//! # Submodules
//!
//! - [`markdown`]: Converts a [`Page`](crate::models::Page) to Markdown for the terminal
//! - [`json`]: Writes a `Page` to a JSON file per topic
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── all.json
//! ├── nlp.json
//! └── robotics.json
//! ```

pub mod json;
pub mod markdown;
