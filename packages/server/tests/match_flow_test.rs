//! End-to-end tests: a real server on an ephemeral port, driven over WebSocket and HTTP.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use taikyoku_server::{
    domain::TimeControl,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
        rules::ShakmatyRules,
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, EventRouter,
        GetSessionDetailUseCase, GetSessionsUseCase, MakeMoveUseCase, TurnTimer,
    },
};
use taikyoku_shared::time::SystemClock;
use tokio::{net::TcpListener, net::TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process server bound to 127.0.0.1 on a free port
struct TestServer {
    port: u16,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(TimeControl::default(), false).await
    }

    async fn start_with(time_control: TimeControl, active_timeout: bool) -> Self {
        let repository = Arc::new(InMemorySessionRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let clock = Arc::new(SystemClock);
        let turn_timer = Arc::new(TurnTimer::new(
            active_timeout,
            repository.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let event_router = Arc::new(EventRouter::new(
            Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                Arc::new(ShakmatyRules),
                clock.clone(),
                turn_timer.clone(),
                time_control,
            )),
            Arc::new(MakeMoveUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                turn_timer.clone(),
            )),
            Arc::new(DisconnectParticipantUseCase::new(
                repository.clone(),
                message_pusher,
                clock,
                turn_timer,
            )),
        ));
        let server = Server::new(
            event_router,
            Arc::new(GetSessionsUseCase::new(repository.clone())),
            Arc::new(GetSessionDetailUseCase::new(repository)),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(server.serve(listener, std::future::pending()));

        Self { port }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Session removal follows the game_over broadcast, so poll briefly
    async fn wait_until_removed(&self, room_id: &str) {
        let url = self.http_url(&format!("/api/sessions/{room_id}"));
        for _ in 0..50 {
            let status = reqwest::get(&url).await.unwrap().status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("session '{room_id}' was not removed");
    }

    async fn connect(&self) -> Socket {
        let (socket, _) = connect_async(self.ws_url()).await.unwrap();
        socket
    }

    /// Connect two participants and consume the pairing frames; returns (white, black, room_id)
    async fn start_game(&self) -> (Socket, Socket, String) {
        let mut white = self.connect().await;
        assert_eq!(
            recv_json(&mut white).await,
            json!({"type": "status", "text": "Searching for opponent..."})
        );
        let mut black = self.connect().await;

        let white_role = recv_json(&mut white).await;
        let black_role = recv_json(&mut black).await;
        assert_eq!(white_role["type"], "player_role");
        assert_eq!(white_role["role"], "w");
        assert_eq!(black_role["role"], "b");
        assert_eq!(white_role["room_id"], black_role["room_id"]);
        assert_eq!(recv_json(&mut white).await, json!({"type": "game_start"}));
        assert_eq!(recv_json(&mut black).await, json!({"type": "game_start"}));

        let room_id = white_role["room_id"].as_str().unwrap().to_string();
        (white, black, room_id)
    }
}

async fn recv_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn expect_silence(socket: &mut Socket) {
    let result = tokio::time::timeout(Duration::from_millis(300), socket.next()).await;
    assert!(result.is_err(), "unexpected frame: {result:?}");
}

async fn send_move(socket: &mut Socket, room_id: &str, from: &str, to: &str) {
    let frame = json!({"type": "move", "move": {"from": from, "to": to}, "room_id": room_id});
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Consume update_timers / move / board_state for one accepted move
async fn expect_move_frames(socket: &mut Socket, from: &str, to: &str) -> Value {
    assert_eq!(recv_json(socket).await["type"], "update_timers");
    assert_eq!(
        recv_json(socket).await,
        json!({"type": "move", "move": {"from": from, "to": to}})
    );
    let board = recv_json(socket).await;
    assert_eq!(board["type"], "board_state");
    board
}

#[tokio::test]
async fn test_pairing_assigns_roles_in_connection_order() {
    // テスト項目: 先に接続した参加者が白、後の参加者が黒になり、両者に開始が届く
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (_white, _black, room_id) = server.start_game().await;

    // then (期待する結果):
    let sessions: Value = reqwest::get(server.http_url("/api/sessions"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["room_id"], room_id.as_str());
    assert_eq!(sessions[0]["side_to_move"], "w");
}

#[tokio::test]
async fn test_moves_are_relayed_to_both_participants() {
    // テスト項目: 合法手は両者に時計・指し手・局面として届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut white, mut black, room_id) = server.start_game().await;

    // when (操作):
    send_move(&mut white, &room_id, "e2", "e4").await;

    // then (期待する結果):
    let white_board = expect_move_frames(&mut white, "e2", "e4").await;
    let black_board = expect_move_frames(&mut black, "e2", "e4").await;
    assert_eq!(white_board, black_board);
    assert!(
        white_board["fen"]
            .as_str()
            .unwrap()
            .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b")
    );
}

#[tokio::test]
async fn test_invalid_move_is_reported_to_mover_only() {
    // テスト項目: 手番違い・非合法手は本人にのみ invalid_move が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut white, mut black, room_id) = server.start_game().await;

    // when (操作):
    send_move(&mut black, &room_id, "e7", "e5").await;
    send_move(&mut white, &room_id, "e2", "e5").await;

    // then (期待する結果):
    assert_eq!(recv_json(&mut black).await, json!({"type": "invalid_move"}));
    assert_eq!(recv_json(&mut white).await, json!({"type": "invalid_move"}));
    expect_silence(&mut black).await;

    let detail: Value = reqwest::get(server.http_url(&format!("/api/sessions/{room_id}")))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["ply"], 0);
    assert_eq!(detail["side_to_move"], "w");
}

#[tokio::test]
async fn test_fools_mate_ends_game_and_removes_session() {
    // テスト項目: フールズメイトで両者に黒の詰み勝ちが届き、セッションが削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut white, mut black, room_id) = server.start_game().await;
    let opening = [("f2", "f3"), ("e7", "e5"), ("g2", "g4")];
    for (n, (from, to)) in opening.iter().enumerate() {
        let mover = if n % 2 == 0 { &mut white } else { &mut black };
        send_move(mover, &room_id, from, to).await;
        expect_move_frames(&mut white, from, to).await;
        expect_move_frames(&mut black, from, to).await;
    }

    // when (操作):
    send_move(&mut black, &room_id, "d8", "h4").await;

    // then (期待する結果):
    let game_over = json!({"type": "game_over", "result": "b", "reason": "checkmate"});
    expect_move_frames(&mut white, "d8", "h4").await;
    expect_move_frames(&mut black, "d8", "h4").await;
    assert_eq!(recv_json(&mut white).await, game_over);
    assert_eq!(recv_json(&mut black).await, game_over);

    server.wait_until_removed(&room_id).await;
}

#[tokio::test]
async fn test_disconnect_awards_remaining_participant() {
    // テスト項目: 対局中に切断すると残った参加者に離脱勝ちが届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut white, mut black, room_id) = server.start_game().await;

    // when (操作):
    black.close(None).await.unwrap();

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut white).await,
        json!({"type": "game_over", "result": "w", "reason": "opponent_departed"})
    );
    server.wait_until_removed(&room_id).await;
}

#[tokio::test]
async fn test_waiting_participant_can_leave_and_next_one_waits() {
    // テスト項目: 待機中の参加者が切断すると、次の参加者は新たに待機する
    // given (前提条件):
    let server = TestServer::start().await;
    let mut first = server.connect().await;
    recv_json(&mut first).await;

    // when (操作):
    first.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    let mut second = server.connect().await;

    // then (期待する結果):
    assert_eq!(recv_json(&mut second).await["type"], "status");
    expect_silence(&mut second).await;
}

#[tokio::test]
async fn test_active_timeout_flags_stalled_side() {
    // テスト項目: 能動タイマー有効時、手番側が指さないまま時間切れになると両者に通知される
    // given (前提条件):
    let server = TestServer::start_with(TimeControl::new(300), true).await;

    // when (操作):
    let (mut white, mut black, room_id) = server.start_game().await;

    // then (期待する結果):
    let game_over = json!({"type": "game_over", "result": "b", "reason": "timeout"});
    for socket in [&mut white, &mut black] {
        let timers = recv_json(socket).await;
        assert_eq!(timers["type"], "update_timers");
        assert!(timers["w"].as_i64().unwrap() <= 0);
        assert_eq!(timers["b"], 300);
        assert_eq!(recv_json(socket).await, game_over);
    }
    server.wait_until_removed(&room_id).await;
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, json!({"status": "ok"}));
}
