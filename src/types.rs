/// Case identifier shared by message and outcome rows.
/// Example: `0f8c1b7e-3d5a-4b1e-9f3a-6a2c4d8e1b20`
pub type CaseId = String;
/// Raw actor name as it appears in an input dataset.
/// Examples: `Jordan Reyes`, `jreyes`
pub type ActorName = String;
/// Human-readable label for a matched or violated rubric signal.
/// Examples: `Contains clear call-to-action`, `Aggressive tone: asap`
pub type SignalLabel = String;
/// Column name in a tabular input.
/// Examples: `opportunity_uuid`, `ai_agent_tag`
pub type ColumnName = String;
/// Logical dataset name used in diagnostics.
/// Examples: `messages`, `outcomes`
pub type DatasetName = String;
