//! 名前付きアドバイザリロック
//!
//! 監査ログシートへの追記を直列化するための協調的な排他ロック。
//! ロックを明示的に取得する参加者同士の衝突だけを防ぐ。
//!
//! 排他の範囲は1プロセス内のみ。同じ `ScriptLock` の Clone 同士は排他されるが、
//! `new` で別に作ったインスタンスや別プロセスとは排他されない。
//! 同じデータベースを複数プロセスで共有する構成では追記は直列化されない
//! （行番号の採番自体は各ストアの `append_row` が原子的に行う）。
//!
//! # 機能
//!
//! - 待機時間の上限付き取得（`try_lock_for`）
//! - 即時取得（`try_lock`）
//! - ガードのDropで無条件に解放

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// ロック取得結果
#[derive(Debug)]
pub enum LockOutcome {
    /// 待機時間内に取得できた
    Acquired(LockGuard),
    /// 待機時間内に取得できなかった
    TimedOut,
}

/// 保持中のロック（Dropで解放）
#[derive(Debug)]
pub struct LockGuard {
    name: Arc<str>,
    acquired_at: Instant,
    _guard: OwnedMutexGuard<()>,
}

impl LockGuard {
    /// ロック名
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        debug!(
            lock = %self.name,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "Lock released"
        );
    }
}

/// 名前付きアドバイザリロック
///
/// Clone したインスタンスは同じロックを共有する。
#[derive(Debug, Clone)]
pub struct ScriptLock {
    name: Arc<str>,
    inner: Arc<Mutex<()>>,
}

impl ScriptLock {
    /// 新しいロックを作成
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(())),
        }
    }

    /// ロック名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 最大 `wait` だけ待ってロックを取得する
    ///
    /// 取得を試みるのは1回のみ。タイムアウト時は `LockOutcome::TimedOut`。
    pub async fn try_lock_for(&self, wait: Duration) -> LockOutcome {
        match tokio::time::timeout(wait, self.inner.clone().lock_owned()).await {
            Ok(guard) => {
                debug!(lock = %self.name, "Lock acquired");
                LockOutcome::Acquired(self.guard(guard))
            }
            Err(_) => {
                debug!(
                    lock = %self.name,
                    wait_ms = wait.as_millis() as u64,
                    "Lock wait timed out"
                );
                LockOutcome::TimedOut
            }
        }
    }

    /// 待機せずにロックを取得する
    pub fn try_lock(&self) -> Option<LockGuard> {
        self.inner
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| self.guard(guard))
    }

    fn guard(&self, guard: OwnedMutexGuard<()>) -> LockGuard {
        LockGuard {
            name: self.name.clone(),
            acquired_at: Instant::now(),
            _guard: guard,
        }
    }
}
