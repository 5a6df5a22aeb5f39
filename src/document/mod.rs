/*!
 * Document model for TextGrid annotations.
 */

pub mod model;

pub use model::{keys, Attributes, Document, Interval, SkippedLine, Tier};
