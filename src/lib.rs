//! csv2json - CSV TO JSON CONVERTER
//!
//! 헤더 줄이 있는 CSV 파일을 "열 이름 → 값" 객체의 JSON 배열로 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔎 **구분자 자동 감지**: 앞부분 샘플로 `,` `;` 탭 `|` `:` 중 일관된 구분자 선택
//! - 🧹 **공백 정리**: 키는 항상, 값은 옵션에 따라 앞뒤 공백 제거
//! - 📐 **들여쓰기 조절**: `--indent N`, 0이면 압축 출력
//! - 🌏 **비ASCII 보존**: 한글 등은 이스케이프 없이 그대로 출력
//! - 📁 **폴더 모드**: 폴더 안 CSV 파일을 파일별로 독립 변환, 실패해도 계속 진행
//! - 🎯 **열 선택**: 특정 열만 추출
//! - 📊 **통계/로그**: 처리 통계와 에러 로그 파일
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (data.json 생성)
//! csv2json data.csv
//!
//! # 출력 경로와 들여쓰기 지정
//! csv2json data.csv out.json --indent 4
//!
//! # 폴더 전체 변환
//! csv2json ./csv ./json
//! ```

pub mod batch;
pub mod cli;
pub mod converter;
pub mod error;
pub mod pattern;
pub mod sniff;
pub mod stats;

// Re-exports for convenient access
pub use batch::{default_output_path, run_batch, ConversionJob};
pub use cli::{Args, WriteMode};
pub use converter::{
    convert_file, parse_document, render_json, ConversionResult, ConvertOptions, Document, Record,
};
pub use error::{ConvertError, ErrorKind, Result};
pub use pattern::FileFilter;
pub use sniff::detect_delimiter;
pub use stats::{format_bytes, Statistics};
