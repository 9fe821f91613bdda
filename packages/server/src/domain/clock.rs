//! 対局時計 (GameClock)
//!
//! 手番の切り替わり（ターン境界）ごとに、前回の境界からの経過時間を
//! その区間の手番側の残り時間から差し引く「遅延評価」方式の時計です。
//!
//! 残り時間は負の値になり得ます。時間切れ判定はこの値をそのまま参照し、
//! 表示用の 0 への切り上げは受信側が行います。

use super::value_object::{Side, Timestamp};

/// 持ち時間の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    /// 各手番の初期持ち時間（ミリ秒）
    pub initial_millis: i64,
}

impl TimeControl {
    pub const DEFAULT_INITIAL_MILLIS: i64 = 5 * 60 * 1000;

    pub fn new(initial_millis: i64) -> Self {
        Self { initial_millis }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(i64::from(minutes) * 60 * 1000)
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_MILLIS)
    }
}

/// 両手番の残り時間のスナップショット（ブロードキャスト用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub white_millis: i64,
    pub black_millis: i64,
}

impl ClockSnapshot {
    pub fn remaining(&self, side: Side) -> i64 {
        match side {
            Side::White => self.white_millis,
            Side::Black => self.black_millis,
        }
    }
}

/// 対局時計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    white_millis: i64,
    black_millis: i64,
    last_boundary: Timestamp,
}

impl GameClock {
    /// `started_at` を最初のターン境界として時計を作成
    pub fn new(time_control: TimeControl, started_at: Timestamp) -> Self {
        Self {
            white_millis: time_control.initial_millis,
            black_millis: time_control.initial_millis,
            last_boundary: started_at,
        }
    }

    /// ターン境界の更新
    ///
    /// 前回の境界から `now` までの経過時間を、全て `side_on_move` に計上します。
    /// 壁時計が巻き戻った場合の経過時間は 0 として扱います。
    pub fn tick(&mut self, side_on_move: Side, now: Timestamp) -> ClockSnapshot {
        let elapsed = (now.value() - self.last_boundary.value()).max(0);
        match side_on_move {
            Side::White => self.white_millis -= elapsed,
            Side::Black => self.black_millis -= elapsed,
        }
        self.last_boundary = now;
        self.snapshot()
    }

    pub fn remaining(&self, side: Side) -> i64 {
        match side {
            Side::White => self.white_millis,
            Side::Black => self.black_millis,
        }
    }

    /// 残り時間が 0 以下か
    pub fn is_flagged(&self, side: Side) -> bool {
        self.remaining(side) <= 0
    }

    pub fn last_boundary(&self) -> Timestamp {
        self.last_boundary
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            white_millis: self.white_millis,
            black_millis: self.black_millis,
        }
    }
}
