//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::converter::{ConvertOptions, DEFAULT_INDENT};
use crate::error::ConvertError;

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// csv2json CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "csv2json",
    author = "YourName <your@email.com>",
    version,
    about = "CSV TO JSON CONVERTER - CSV 파일을 들여쓰기된 JSON 배열로 변환하는 CLI 도구",
    long_about = r#"
CSV TO JSON CONVERTER
=====================

헤더 줄이 있는 CSV 파일을 읽어 각 행을 "열 이름 → 값" 객체로 만들고
JSON 배열로 저장합니다. 입력이 폴더이면 폴더 안의 CSV 파일을 모두 변환합니다.

특징:
  • 구분자 자동 감지 (, ; 탭 | :)
  • 키/값 앞뒤 공백 정리
  • 들여쓰기 조절 (0이면 압축 출력)
  • 폴더 모드: 파일별 독립 처리, 실패해도 나머지 계속 변환
  • 비ASCII 문자 그대로 유지

예제:
  csv2json input.csv
  csv2json input.csv output.json
  csv2json input.csv --indent 4
  csv2json input.csv -d ';' --no-trim
  csv2json ./data ./json --pattern "sales_*"
"#
)]
pub struct Args {
    /// 입력 CSV 파일 또는 CSV 파일들이 있는 폴더
    pub input: PathBuf,

    /// 출력 JSON 파일 (폴더 모드에서는 출력 폴더, 기본값: 입력 경로의 확장자를 .json으로)
    pub output: Option<PathBuf>,

    /// JSON 들여쓰기 칸 수 (0이면 압축 출력)
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    pub indent: usize,

    /// 필드 구분자 (한 글자 또는 "tab", 생략 시 자동 감지)
    #[arg(short, long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// 값의 앞뒤 공백을 그대로 유지
    #[arg(long)]
    pub no_trim: bool,

    /// 헤더보다 긴 행의 초과 값을 담을 키 (생략 시 버림)
    #[arg(long)]
    pub rest_key: Option<String>,

    /// 출력할 열 (쉼표로 구분, 예: "id,name")
    #[arg(long)]
    pub fields: Option<String>,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 폴더 모드 파일 이름 패턴 필터 (glob 형식, 예: "sales_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 폴더 모드 최대 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 폴더 모드 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// CSV 파싱만 수행 (JSON 파일을 쓰지 않음)
    #[arg(long)]
    pub validate_only: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 필드 목록을 파싱하여 벡터로 반환
    ///
    /// 이름이 하나도 없으면 (`--fields ""`) 지정하지 않은 것으로 봅니다.
    pub fn get_fields(&self) -> Option<Vec<String>> {
        let fields: Vec<String> = self
            .fields
            .as_deref()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        (!fields.is_empty()).then_some(fields)
    }

    /// 인자로부터 변환 옵션 생성
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .with_delimiter(self.delimiter)
            .with_indent(self.indent)
            .with_trim(!self.no_trim)
            .with_rest_key(self.rest_key.clone())
            .with_fields(self.get_fields())
            .with_validate_only(self.validate_only)
            .with_write_mode(self.mode)
    }
}

/// 구분자 인자 파싱
///
/// 한 글자 ASCII 문자, 또는 `tab` / `\t` 를 받습니다.
/// 따옴표와 줄바꿈 문자는 구분자로 쓸 수 없습니다.
pub fn parse_delimiter(value: &str) -> Result<u8, ConvertError> {
    let delimiter = match value {
        "tab" | "\\t" | "\t" => b'\t',
        v if v.len() == 1 && v.is_ascii() => v.as_bytes()[0],
        _ => 0,
    };

    if matches!(delimiter, 0 | b'"' | b'\n' | b'\r') {
        return Err(ConvertError::InvalidDelimiter {
            value: value.to_string(),
        });
    }

    Ok(delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
    }

    #[test]
    fn test_parse_delimiter_rejects() {
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter("가").is_err());
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["csv2json", "input.csv"]).unwrap();
        assert_eq!(args.input, PathBuf::from("input.csv"));
        assert!(args.output.is_none());
        assert_eq!(args.indent, 2);
        assert_eq!(args.delimiter, None);
        assert_eq!(args.mode, WriteMode::Overwrite);
        assert!(!args.no_trim);
    }

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "csv2json",
            "input.csv",
            "out.json",
            "--indent",
            "4",
            "-d",
            ";",
            "--no-trim",
            "--mode",
            "error",
        ])
        .unwrap();

        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.indent, 4);
        assert_eq!(args.delimiter, Some(b';'));
        assert!(args.no_trim);
        assert_eq!(args.mode, WriteMode::Error);

        let options = args.to_options();
        assert_eq!(options.indent, 4);
        assert_eq!(options.delimiter, Some(b';'));
        assert!(!options.trim);
        assert_eq!(options.write_mode, WriteMode::Error);
    }

    #[test]
    fn test_empty_fields_means_all_columns() {
        let args = Args::try_parse_from(["csv2json", "in.csv", "--fields", ""]).unwrap();
        assert_eq!(args.get_fields(), None);

        let args = Args::try_parse_from(["csv2json", "in.csv", "--fields", ",id,"]).unwrap();
        assert_eq!(args.get_fields(), Some(vec!["id".to_string()]));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Args::try_parse_from(["csv2json"]).is_err());
    }
}
