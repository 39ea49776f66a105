mod admin_action_repo;
mod governance_repo;
mod job_repo;
mod outbox_repo;

pub use admin_action_repo::AdminActionRepo;
pub use governance_repo::GovernanceRepo;
pub use job_repo::JobRepo;
pub use outbox_repo::OutboxRepo;
