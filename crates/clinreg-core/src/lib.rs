pub mod curate;
pub mod identifiers;
pub mod normalize;
pub mod pipeline;

pub use curate::{curate, curate_with_pipeline, reclassify_batch};
pub use identifiers::{ReplacementMap, assign_participant_ids, reclassify};
pub use normalize::{clean_sentinels, conform_to_schema};
pub use pipeline::{
    CurationStep, EntityPipeline, ParticipantIdStep, SchemaConformanceStep, SentinelCleanupStep,
    build_default_pipeline,
};
