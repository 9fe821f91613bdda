//! Infrastructure 層
//!
//! ドメイン層が定義する trait（Repository, MessagePusher, RulesEngine）の
//! 具体的な実装と、ワイヤ形式（DTO）を提供します。

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod rules;
