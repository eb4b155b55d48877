// quotecoder: coding worksheets and topic timelines from influencer quote tweets
//
// This is the library root. Each module corresponds to one stage of the
// extraction -> sampling -> worksheet / topics workflow.

pub mod config;
pub mod db;
pub mod output;
pub mod pipeline;
pub mod sampling;
pub mod status;
pub mod topics;
pub mod worksheet;
