mod activities;
mod groups;
mod sessions;
mod words;

pub use activities::StudyActivityService;
pub use groups::GroupService;
pub use sessions::StudySessionService;
pub use words::WordService;
