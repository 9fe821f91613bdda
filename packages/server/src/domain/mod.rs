//! ドメイン層
//!
//! 対局のルール（手番・時計・終局）と、外部に依存するもの（Repository,
//! MessagePusher, ルールエンジン）のインターフェースを定義します。

pub mod clock;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod outcome;
pub mod repository;
pub mod rules;
pub mod session;
pub mod value_object;

pub use clock::{ClockSnapshot, GameClock, TimeControl};
pub use error::{MessagePushError, RepositoryError, RulesError, ValueObjectError};
pub use event::ServerEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use outcome::{EndReason, GameOutcome, GameResult};
pub use repository::{Pairing, SessionBuilder, SessionHandle, SessionRepository};
pub use rules::{LegalMove, Position, RulesEngine};
pub use session::{
    DepartureReport, ExpiryReport, GameSession, MoveRejection, MoveReport, Seats, SessionState,
    SessionSummary,
};
pub use value_object::{
    ChessMove, ParticipantId, ParticipantIdFactory, PromotionPiece, SessionKey, Side, Square,
    Timestamp,
};
