//! CSV → JSON 변환 모듈
//!
//! 입력 텍스트를 헤더/데이터 행으로 나누어 레코드를 만들고,
//! 레코드 배열을 JSON으로 직렬화합니다. 파일 단위 변환(`convert_file`)은
//! 모든 에러를 `ConversionResult`에 담아 반환하는 경계 역할을 합니다.

use csv::{ReaderBuilder, StringRecord};
use memmap2::Mmap;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::batch::ConversionJob;
use crate::cli::WriteMode;
use crate::error::{ConvertError, ErrorKind, Result};
use crate::sniff::{detect_delimiter, open_quote_line};

/// 기본 들여쓰기 칸 수
pub const DEFAULT_INDENT: usize = 2;

/// 열 이름 → 셀 값 (헤더 순서 유지)
pub type Record = Map<String, Value>;

/// 한 입력 파일에서 만들어진 레코드 배열
///
/// JSON으로는 레코드 배열만 직렬화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    /// 데이터 행 순서대로의 레코드
    pub records: Vec<Record>,
    /// 정리된 헤더
    #[serde(skip)]
    pub header: Vec<String>,
    /// 사용된 구분자 (빈 입력이면 None)
    #[serde(skip)]
    pub delimiter: Option<u8>,
}

impl Document {
    /// 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 레코드가 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 변환 옵션
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 명시적 구분자 (None이면 자동 감지)
    pub delimiter: Option<u8>,
    /// JSON 들여쓰기 칸 수 (0이면 압축 출력)
    pub indent: usize,
    /// 값의 앞뒤 공백 제거 여부 (헤더는 항상 정리)
    pub trim: bool,
    /// 초과 값을 담을 키 (None이면 버림)
    pub rest_key: Option<String>,
    /// 출력할 열 목록 (None이면 전체)
    pub fields: Option<Vec<String>>,
    /// 파싱만 수행
    pub validate_only: bool,
    /// 출력 파일 모드
    pub write_mode: WriteMode,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            indent: DEFAULT_INDENT,
            trim: true,
            rest_key: None,
            fields: None,
            validate_only: false,
            write_mode: WriteMode::Overwrite,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ConvertOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 구분자 설정
    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 들여쓰기 설정
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// 공백 정리 설정
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// 초과 값 키 설정
    pub fn with_rest_key(mut self, rest_key: Option<String>) -> Self {
        self.rest_key = rest_key;
        self
    }

    /// 열 선택 설정
    pub fn with_fields(mut self, fields: Option<Vec<String>>) -> Self {
        self.fields = fields;
        self
    }

    /// 유효성 검사 모드 설정
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    /// 출력 모드 설정
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }
}

/// 파일 단위 변환 결과
#[derive(Debug)]
pub struct ConversionResult {
    /// 입력 파일 경로
    pub input: PathBuf,
    /// 출력 파일 경로
    pub output: PathBuf,
    /// 변환된 레코드 수
    pub record_count: usize,
    /// 사용된 구분자
    pub delimiter: Option<u8>,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓴 바이트 (유효성 검사 모드에서는 0)
    pub bytes_written: u64,
    /// 에러 (실패 시)
    pub error: Option<ConvertError>,
}

impl ConversionResult {
    fn failure(job: &ConversionJob, error: ConvertError, bytes_read: u64) -> Self {
        Self {
            input: job.input.clone(),
            output: job.output.clone(),
            record_count: 0,
            delimiter: None,
            bytes_read,
            bytes_written: 0,
            error: Some(error),
        }
    }

    /// 성공 여부
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// 성공했지만 데이터 행이 없었는지 확인
    pub fn is_empty(&self) -> bool {
        self.is_success() && self.record_count == 0
    }

    /// 실패 시 에러 분류
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ConvertError::kind)
    }
}

/// 텍스트를 레코드 배열로 파싱
///
/// # Arguments
/// * `text` - CSV 텍스트 (첫 줄은 헤더)
/// * `options` - 변환 옵션
///
/// # Examples
/// ```
/// use csv2json::converter::{parse_document, ConvertOptions};
///
/// let doc = parse_document("name,age\nAlice,30\n", &ConvertOptions::new()).unwrap();
/// assert_eq!(doc.len(), 1);
/// assert_eq!(doc.records[0]["age"], "30");
/// ```
pub fn parse_document(text: &str, options: &ConvertOptions) -> Result<Document> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Ok(Document::default());
    }

    let delimiter = match options.delimiter {
        Some(d) => d,
        None => detect_delimiter(text)?,
    };

    if let Some(line) = open_quote_line(text, delimiter) {
        return Err(ConvertError::UnterminatedQuote { line });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut rows = reader.records();

    let header: Vec<String> = match rows.next() {
        Some(row) => row?.iter().map(|h| h.trim().to_string()).collect(),
        None => {
            return Ok(Document {
                delimiter: Some(delimiter),
                ..Document::default()
            })
        }
    };

    let mut records = Vec::new();
    for row in rows {
        let record = build_record(&header, &row?, options);
        records.push(match &options.fields {
            Some(fields) => project(record, fields),
            None => record,
        });
    }

    Ok(Document {
        records,
        header,
        delimiter: Some(delimiter),
    })
}

/// 헤더와 행을 묶어 레코드 생성
///
/// 짧은 행의 빠진 열은 `null`, 긴 행의 초과 값은 `rest_key`가 있으면
/// 배열로 보존하고 없으면 버립니다. 중복 헤더는 마지막 값이 남습니다.
fn build_record(header: &[String], row: &StringRecord, options: &ConvertOptions) -> Record {
    let mut record = Map::with_capacity(header.len());

    for (i, name) in header.iter().enumerate() {
        let value = match row.get(i) {
            Some(cell) if options.trim => Value::String(cell.trim().to_string()),
            Some(cell) => Value::String(cell.to_string()),
            None => Value::Null,
        };
        record.insert(name.clone(), value);
    }

    if let Some(ref rest_key) = options.rest_key {
        if row.len() > header.len() {
            let extras = row
                .iter()
                .skip(header.len())
                .map(|cell| {
                    let cell = if options.trim { cell.trim() } else { cell };
                    Value::String(cell.to_string())
                })
                .collect();
            record.insert(rest_key.clone(), Value::Array(extras));
        }
    }

    record
}

/// 레코드에서 지정한 열만 지정한 순서로 추출
fn project(mut record: Record, fields: &[String]) -> Record {
    let mut projected = Map::with_capacity(fields.len());
    for field in fields {
        if let Some(value) = record.remove(field) {
            projected.insert(field.clone(), value);
        }
    }
    projected
}

/// 레코드 배열을 JSON으로 기록
///
/// `indent`가 0이면 공백 없는 압축 출력, 그 외에는 `indent`칸 들여쓰기입니다.
/// 키 순서는 헤더 순서이며 비ASCII 문자는 이스케이프하지 않습니다.
pub fn write_json<W: Write>(document: &Document, indent: usize, writer: W) -> Result<()> {
    let result = if indent == 0 {
        serde_json::to_writer(writer, document)
    } else {
        let spaces = vec![b' '; indent];
        let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(&spaces));
        document.serialize(&mut ser)
    };

    result.map_err(|e| ConvertError::Serialize {
        reason: e.to_string(),
    })
}

/// 레코드 배열을 JSON 문자열로 변환
pub fn render_json(document: &Document, indent: usize) -> Result<String> {
    let mut buf = Vec::new();
    write_json(document, indent, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ConvertError::Serialize {
        reason: e.to_string(),
    })
}

/// 입력 파일 전체를 UTF-8 텍스트로 읽기
///
/// # Returns
/// (텍스트, 파일 크기)
pub fn read_input(path: &Path, mmap_threshold: u64) -> Result<(String, u64)> {
    if !path.exists() {
        return Err(ConvertError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(ConvertError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let read_error = |e: std::io::Error| ConvertError::Read {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(read_error)?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    let bytes = if file_size >= mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        let mmap = unsafe { Mmap::map(&file).map_err(read_error)? };
        mmap.to_vec()
    } else {
        let mut buf = Vec::with_capacity(file_size as usize);
        file.read_to_end(&mut buf).map_err(read_error)?;
        buf
    };

    let text = String::from_utf8(bytes).map_err(|e| ConvertError::Encoding {
        file: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })?;

    Ok((text, file_size))
}

/// 단일 CSV 파일 변환
///
/// 어떤 실패도 호출자에게 전파하지 않고 `ConversionResult`에 담습니다.
///
/// # Arguments
/// * `job` - 입력/출력 경로 쌍
/// * `options` - 변환 옵션
pub fn convert_file(job: &ConversionJob, options: &ConvertOptions) -> ConversionResult {
    let (text, bytes_read) = match read_input(&job.input, options.mmap_threshold) {
        Ok(input) => input,
        Err(e) => return ConversionResult::failure(job, e, 0),
    };

    match convert_text(&text, &job.output, options) {
        Ok((document, bytes_written)) => ConversionResult {
            input: job.input.clone(),
            output: job.output.clone(),
            record_count: document.len(),
            delimiter: document.delimiter,
            bytes_read,
            bytes_written,
            error: None,
        },
        Err(e) => ConversionResult::failure(job, e, bytes_read),
    }
}

/// 파싱 후 출력 파일을 한 번에 기록
fn convert_text(text: &str, output: &Path, options: &ConvertOptions) -> Result<(Document, u64)> {
    let document = parse_document(text, options)?;

    if options.validate_only {
        return Ok((document, 0));
    }

    if options.write_mode == WriteMode::Error && output.exists() {
        return Err(ConvertError::OutputExists {
            path: output.to_path_buf(),
        });
    }

    let mut buf = Vec::new();
    write_json(&document, options.indent, &mut buf)?;

    let write_error = |e: std::io::Error| ConvertError::Write {
        file: output.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(output, &buf).map_err(write_error)?;

    Ok((document, buf.len() as u64))
}
