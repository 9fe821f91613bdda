//! UseCase 層
//!
//! ドメインモデルと外部（Repository, MessagePusher, ルールエンジン, 壁時計）を
//! 組み合わせて、マッチメイク・指し手・切断・参照系の処理を行います。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_session_detail;
pub mod get_sessions;
pub mod make_move;
pub mod router;
pub mod turn_timer;

pub use connect_participant::{ConnectOutcome, ConnectParticipantUseCase, SEARCHING_STATUS};
pub use disconnect_participant::{DisconnectOutcome, DisconnectParticipantUseCase};
pub use error::{ConnectError, GetSessionDetailError, MoveError};
pub use get_session_detail::GetSessionDetailUseCase;
pub use get_sessions::GetSessionsUseCase;
pub use make_move::{MakeMoveUseCase, MoveCommand, MoveOutcome};
pub use router::{EventRouter, GameEvent};
pub use turn_timer::TurnTimer;
