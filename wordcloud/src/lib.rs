//! Word clouds from filtered text: stop-word filtering, per-category
//! accumulation, frequency counting, layout and PNG rendering.

pub mod accumulator;
pub mod builder;
pub mod categories;
pub mod frequencies;
pub mod layout;
pub mod palette;
pub mod render;
pub mod stopwords;

pub use accumulator::{AccumulateMode, CorpusAccumulator};
pub use builder::{run, CloudOutcome, WordCloudBuilder};
pub use categories::CategoryRules;
pub use frequencies::{word_frequencies, WordFrequency};
pub use layout::{layout, CloudLayout, LayoutOptions, PlacedWord};
pub use render::{CloudRenderer, PngRenderer};
pub use stopwords::StopWords;
