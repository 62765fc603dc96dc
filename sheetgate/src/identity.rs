//! 実行ユーザーの識別
//!
//! 監査ログのアクター欄に記録するメールアドレスを提供する。

use crate::config::IdentityConfig;
use async_trait::async_trait;

/// 実行ユーザーのメールアドレスを返すプロバイダ
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 現在のユーザーのメールアドレス（不明な場合は空文字）
    async fn current_user_email(&self) -> String;
}

/// 設定値を返すプロバイダ
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    email: String,
}

impl ConfiguredIdentity {
    /// メールアドレスを指定して作成
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl From<IdentityConfig> for ConfiguredIdentity {
    fn from(config: IdentityConfig) -> Self {
        Self::new(config.active_user_email)
    }
}

#[async_trait]
impl IdentityProvider for ConfiguredIdentity {
    async fn current_user_email(&self) -> String {
        self.email.clone()
    }
}
