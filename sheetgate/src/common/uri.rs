//! URIエンコード/デコード
//!
//! `decode_uri` は ECMAScript の `decodeURI` と同じ規則で動作する。
//! 予約文字（`; / ? : @ & = + $ , #`）にデコードされるエスケープはそのまま残す。

/// 予約文字（デコードせずに残す）
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// `encode_path_segment` でエスケープしない文字
const UNRESERVED_MARKS: &[u8] = b"-_.!~*'()";

/// 不正なエスケープシーケンス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedUri {
    /// 不正なシーケンスの開始バイト位置
    pub position: usize,
}

/// `decodeURI` 相当のデコード
///
/// `%XX` をUTF-8として復元する。エスケープが不完全・16進でない・
/// UTF-8として不正な場合は `MalformedUri` を返す。
pub fn decode_uri(input: &str) -> Result<String, MalformedUri> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let start = i;
        let lead = hex_byte(bytes, i).ok_or(MalformedUri { position: start })?;
        i += 3;

        if lead < 0x80 {
            if RESERVED.contains(&lead) {
                out.extend_from_slice(&bytes[start..i]);
            } else {
                out.push(lead);
            }
            continue;
        }

        let width = utf8_width(lead).ok_or(MalformedUri { position: start })?;
        let mut seq = Vec::with_capacity(width);
        seq.push(lead);
        for _ in 1..width {
            if bytes.get(i) != Some(&b'%') {
                return Err(MalformedUri { position: start });
            }
            let cont = hex_byte(bytes, i).ok_or(MalformedUri { position: start })?;
            seq.push(cont);
            i += 3;
        }
        // 過長表現・サロゲートは from_utf8 が弾く
        std::str::from_utf8(&seq).map_err(|_| MalformedUri { position: start })?;
        out.extend_from_slice(&seq);
    }

    String::from_utf8(out).map_err(|_| MalformedUri { position: 0 })
}

/// `encodeURIComponent` 相当のエンコード（URLパスの1セグメント用）
pub fn encode_path_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        if b.is_ascii_alphanumeric() || UNRESERVED_MARKS.contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn hex_byte(bytes: &[u8], i: usize) -> Option<u8> {
    let h1 = (*bytes.get(i + 1)? as char).to_digit(16)?;
    let h2 = (*bytes.get(i + 2)? as char).to_digit(16)?;
    Some(((h1 << 4) + h2) as u8)
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}
