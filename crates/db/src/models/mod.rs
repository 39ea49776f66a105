pub mod job;
pub mod outbox;
