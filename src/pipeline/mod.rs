// Pipelines: the two end-to-end workflows the CLI runs.

pub mod extract;
pub mod topics;
