//! 에러 타입 정의 모듈
//!
//! csv2json에서 발생할 수 있는 모든 에러 타입과 분류(`ErrorKind`)를 정의합니다.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 에러 분류
///
/// 파일 단위 변환 결과를 보고할 때 사용하는 상위 분류입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 입력 파일 없음
    NotFound,
    /// 구분자 감지 실패, 따옴표 오류 등 파싱 문제
    Parse,
    /// UTF-8 디코딩 실패
    Encoding,
    /// 입출력 실패
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::Parse => write!(f, "ParseError"),
            ErrorKind::Encoding => write!(f, "EncodingError"),
            ErrorKind::Io => write!(f, "IOError"),
        }
    }
}

/// csv2json에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 파일이 존재하지 않음
    #[error("입력 파일을 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력 경로가 일반 파일이 아님
    #[error("입력 경로가 파일이 아닙니다: {path}")]
    NotAFile { path: PathBuf },

    /// 입력 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    Read { file: PathBuf, reason: String },

    /// UTF-8이 아닌 입력
    #[error("UTF-8 디코딩 실패 ({file}): {offset} 바이트 위치에 잘못된 시퀀스")]
    Encoding { file: PathBuf, offset: usize },

    /// 구분자 자동 감지 실패
    #[error("구분자를 감지할 수 없습니다: {reason}")]
    Sniff { reason: String },

    /// 닫히지 않은 따옴표
    #[error("닫히지 않은 따옴표: {line}번째 줄에서 시작된 필드가 끝나지 않았습니다")]
    UnterminatedQuote { line: u64 },

    /// CSV 토크나이징 실패
    #[error("CSV 파싱 실패: {reason}")]
    Csv { reason: String },

    /// 사용할 수 없는 구분자
    #[error("유효하지 않은 구분자: {value:?}")]
    InvalidDelimiter { value: String },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패: {reason}")]
    Serialize { reason: String },

    /// 출력 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    Write { file: PathBuf, reason: String },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

impl ConvertError {
    /// 에러의 상위 분류 반환
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InputNotFound { .. } => ErrorKind::NotFound,
            ConvertError::Sniff { .. }
            | ConvertError::UnterminatedQuote { .. }
            | ConvertError::Csv { .. }
            | ConvertError::InvalidDelimiter { .. }
            | ConvertError::InvalidPattern { .. } => ErrorKind::Parse,
            ConvertError::Encoding { .. } => ErrorKind::Encoding,
            ConvertError::NotAFile { .. }
            | ConvertError::Read { .. }
            | ConvertError::Serialize { .. }
            | ConvertError::Write { .. }
            | ConvertError::OutputExists { .. } => ErrorKind::Io,
        }
    }
}

impl From<csv::Error> for ConvertError {
    fn from(e: csv::Error) -> Self {
        ConvertError::Csv {
            reason: e.to_string(),
        }
    }
}

/// csv2json 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let not_found = ConvertError::InputNotFound {
            path: PathBuf::from("missing.csv"),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let quote = ConvertError::UnterminatedQuote { line: 3 };
        assert_eq!(quote.kind(), ErrorKind::Parse);

        let encoding = ConvertError::Encoding {
            file: PathBuf::from("latin1.csv"),
            offset: 7,
        };
        assert_eq!(encoding.kind(), ErrorKind::Encoding);

        let exists = ConvertError::OutputExists {
            path: PathBuf::from("out.json"),
        };
        assert_eq!(exists.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_unterminated_quote_message() {
        let msg = ConvertError::UnterminatedQuote { line: 4 }.to_string();
        assert!(msg.contains("4번째 줄"));
    }
}
