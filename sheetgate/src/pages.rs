//! HTMLページの生成
//!
//! テンプレートはバイナリに埋め込み、フォームページのみ
//! タイトル・ファビコン・viewportを固定設定値から差し込む。

use crate::common::error::{GateError, GateResult};
use crate::config::{messages, WebAppConfig};
use include_dir::{include_dir, Dir};

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// フォームページのテンプレート名
pub const FORM_TEMPLATE: &str = "index";

/// 埋め込みテンプレートを名前（拡張子なし）で取得する
pub fn template(name: &str) -> GateResult<&'static str> {
    TEMPLATES
        .get_file(format!("{}.html", name))
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| GateError::Internal(format!("{}: {}.html", messages::NOTFOUND, name)))
}

/// フォームページを生成する
pub fn render_form_page(config: &WebAppConfig) -> GateResult<String> {
    let html = template(FORM_TEMPLATE)?
        .replace("{{title}}", &escape_html(&config.title))
        .replace("{{favicon_url}}", &escape_html(&config.favicon_url))
        .replace("{{viewport_name}}", &escape_html(&config.viewport_name))
        .replace("{{viewport_content}}", &escape_html(&config.viewport_content));
    Ok(html)
}

/// サンクスページを生成する
pub fn render_thankyou_page() -> GateResult<String> {
    template(messages::THANKYOU).map(str::to_string)
}

/// HTML属性・本文用のエスケープ
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
