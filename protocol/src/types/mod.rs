//! Chain data types: blocks, votes and commits, validator sets, evidence
//! and consensus parameters.

pub mod block;
pub mod evidence;
pub mod params;
pub mod validator;
pub mod vote;

pub use block::{Block, Data, Header, MalformedBlock};
pub use evidence::{DuplicateVoteEvidence, Evidence, EvidenceData, EvidenceVerifyError};
pub use params::{BlockSizeParams, BlockTimeParams, ConsensusParams, EvidenceParams, ParamsError};
pub use validator::{Validator, ValidatorSet, ValidatorSetError};
pub use vote::{BlockId, Commit, CommitError, PartSetHeader, Vote, VoteError, VoteType};
