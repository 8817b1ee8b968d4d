pub mod bio_tags;
pub mod linking;
pub mod resolve;

pub use bio_tags::BioTag;
pub use linking::{LinkId, LinkResolver, WIKIDATA_ENTITY_PREFIX};
pub use resolve::TagResolver;
