//! Field names and tokens shared by every entity table.

/// Raw source identifier of a subject.
pub const SUBJECT_UID: &str = "SubjectUID";

/// Derived `<COHORT>-<SubjectUID>` identifier.
pub const PARTICIPANT_ID: &str = "Participant_ID";

/// Cohort code column of the subject registry.
pub const SUBJECT_GROUP_ID: &str = "subject_group_id";

/// Missing-value token emitted by the registry's extract tool.
pub const MISSING_SENTINEL: &str = ".";
