//! 구분자 감지 모듈
//!
//! 입력 앞부분 샘플을 후보 구분자별로 파싱해 보고, 가장 많은 행이 같은 필드 수를
//! 갖는 구분자를 고릅니다. 일부 행이 짧거나 길어도 과반이 일치하면 감지됩니다.

use csv::ReaderBuilder;
use std::collections::HashMap;

use crate::error::{ConvertError, Result};

/// 샘플 최대 크기 (바이트)
pub const SAMPLE_SIZE: usize = 1024;

/// 후보 구분자 (앞쪽일수록 우선)
pub const CANDIDATES: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

/// 최빈 필드 수를 가진 행의 최소 비율
pub const MIN_AGREEMENT: f64 = 0.5;

/// 후보 하나의 감지 점수
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score {
    /// 최빈 필드 수와 일치하는 행의 비율
    agreement: f64,
    /// 최빈 필드 수
    fields: usize,
}

/// 입력 전체에서 샘플을 잘라 구분자 감지
///
/// # Examples
/// ```
/// use csv2json::sniff::detect_delimiter;
///
/// assert_eq!(detect_delimiter("a;b;c\n1;2;3\n").unwrap(), b';');
/// assert_eq!(detect_delimiter("a,b,c\n1,2,3\n4\n").unwrap(), b',');
/// ```
pub fn detect_delimiter(text: &str) -> Result<u8> {
    detect_with_limit(text, SAMPLE_SIZE)
}

/// 주어진 샘플 전체를 사용한 구분자 감지
pub fn sniff_delimiter(sample: &str) -> Result<u8> {
    sniff(sample, false)
}

fn detect_with_limit(text: &str, limit: usize) -> Result<u8> {
    let (sample, cut) = take_sample(text, limit);
    sniff(sample, cut)
}

/// 문자 경계와 줄 경계를 지키며 앞부분 `limit` 바이트 추출
///
/// 두 번째 값은 입력이 샘플보다 길어 잘렸는지 여부입니다.
fn take_sample(text: &str, limit: usize) -> (&str, bool) {
    if text.len() <= limit {
        return (text, false);
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    // 마지막 줄바꿈까지만 사용 (줄바꿈이 없으면 그대로)
    let sample = &text[..end];
    let sample = sample.rfind('\n').map_or(sample, |pos| &sample[..=pos]);
    (sample, true)
}

fn sniff(sample: &str, cut: bool) -> Result<u8> {
    if sample.trim().is_empty() {
        return Err(ConvertError::Sniff {
            reason: "샘플이 비어 있습니다".to_string(),
        });
    }

    let mut best: Option<(u8, Score)> = None;

    for &candidate in &CANDIDATES {
        if !sample.as_bytes().contains(&candidate) {
            continue;
        }

        let Some(score) = score_candidate(sample, candidate, cut) else {
            continue;
        };

        // 일치 비율 → 필드 수 순으로 비교, 동률이면 먼저 나온 후보 유지
        let better = match best {
            None => true,
            Some((_, current)) => {
                score.agreement > current.agreement
                    || (score.agreement == current.agreement && score.fields > current.fields)
            }
        };
        if better {
            best = Some((candidate, score));
        }
    }

    best.map(|(delimiter, _)| delimiter)
        .ok_or_else(|| ConvertError::Sniff {
            reason: "과반의 행에서 같은 열 수를 만드는 구분자가 없습니다".to_string(),
        })
}

/// 후보 구분자로 샘플을 파싱해 최빈 필드 수와 그 비율 계산
///
/// 최빈 필드 수가 2 미만이거나 비율이 `MIN_AGREEMENT` 미만이면 None.
fn score_candidate(sample: &str, delimiter: u8, cut: bool) -> Option<Score> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(sample.as_bytes());

    let mut counts = Vec::new();
    for record in reader.records() {
        counts.push(record.ok()?.len());
    }

    // 샘플 경계에서 실제로 잘린 마지막 레코드만 제외
    let partial_tail =
        cut && (!sample.ends_with('\n') || open_quote_line(sample, delimiter).is_some());
    if partial_tail && counts.len() > 1 {
        counts.pop();
    }

    if counts.is_empty() {
        return None;
    }

    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for &count in &counts {
        *frequency.entry(count).or_default() += 1;
    }

    // 빈도가 같으면 필드 수가 큰 쪽을 최빈값으로
    let (fields, hits) = frequency
        .into_iter()
        .max_by_key(|&(fields, hits)| (hits, fields))?;

    let agreement = hits as f64 / counts.len() as f64;
    if fields < 2 || agreement < MIN_AGREEMENT {
        return None;
    }

    Some(Score { agreement, fields })
}

/// 닫히지 않은 따옴표 필드를 찾아 시작 줄 번호 반환
///
/// 따옴표는 필드 시작 위치에서만 인용을 열고, 인용 안의 `""`는 이스케이프입니다.
pub(crate) fn open_quote_line(text: &str, delimiter: u8) -> Option<u64> {
    let bytes = text.as_bytes();
    let mut line = 1u64;
    let mut open_line = 0u64;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            match b {
                b'"' if bytes.get(i + 1) == Some(&b'"') => i += 1,
                b'"' => in_quotes = false,
                b'\n' => line += 1,
                _ => {}
            }
        } else if b == b'\n' {
            line += 1;
            field_start = true;
        } else if b == b'\r' || b == delimiter {
            field_start = true;
        } else {
            if b == b'"' && field_start {
                in_quotes = true;
                open_line = line;
            }
            field_start = false;
        }
        i += 1;
    }

    in_quotes.then_some(open_line)
}
