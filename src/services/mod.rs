pub mod brain;
pub mod embedder;
pub mod ingest;
pub mod insights;
pub mod intent;
pub mod memory;
pub mod picker;
pub mod selector;
pub mod sessions;
pub mod stats;
pub mod traversal;

pub use brain::SwipeBrain;
pub use embedder::{Embedder, OpenAiEmbedder};
pub use insights::{CachedNarrator, NarrativeGenerator, OpenAiNarrator, TemplateNarrator};
pub use picker::{FirstPicker, Picker, RandomPicker, SeededPicker};
pub use sessions::{SessionRegistry, SweeperHandle};
pub use stats::SessionStats;
