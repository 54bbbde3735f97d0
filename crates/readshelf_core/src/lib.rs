pub mod badges;
pub mod domain;
pub mod ports;

pub use badges::{badge_label, compute_unlocked_badges, Badge, BADGES};
pub use domain::{
    Book, BookDraft, BookPatch, BookStatus, BookThread, DailyLog, GoalDraft, GoalPatch, GoalType,
    ReadingData, ReadingGoal, ReadingSession, SessionDraft, ThreadDraft, ThreadIcon, ThreadPatch,
};
pub use ports::{
    AuthEvent, AuthEventStream, AuthService, LocalStorageService, NotificationRecord, PortError,
    PortResult, RemoteProfile, RemoteStoreService, NOTIFICATION_BADGE_UNLOCKED,
};
